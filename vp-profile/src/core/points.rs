//! Flattens selected gates across an entire volume into one altitude-layer
//! partitioned table, the input to the gate classifier and profile engine.

use crate::config::Config;
use crate::error::{Result, VpProfileError};

use super::cellfinder::CellLabelImage;
use super::image::{PolarImage, ScanMetadata};

/// One row per selected gate: azimuth (deg), elevation (deg), dBZ, vrad,
/// cell label, and gate code (written later by the classifier, `0` here).
///
/// Preallocated once to its final size by [`PointsTable::preallocate`]; a
/// row not yet written by `append_scan` carries `NaN` in its float columns
/// and cell label `-1`, so an under-filled layer (fewer gates admitted than
/// its window allows) is harmless, not a corruption.
#[derive(Debug, Clone, Default)]
pub struct PointsTable {
    pub azimuth: Vec<f32>,
    pub elevation: Vec<f32>,
    pub dbz: Vec<f32>,
    pub vrad: Vec<f32>,
    pub cell_label: Vec<i32>,
    pub gate_code: Vec<u32>,
    /// Next unwritten row within each layer's window; advanced by `append_scan`.
    cursor: Vec<usize>,
}

impl PointsTable {
    /// Total number of rows.
    pub fn len(&self) -> usize {
        self.azimuth.len()
    }

    pub fn is_empty(&self) -> bool {
        self.azimuth.is_empty()
    }

    /// Allocates a table sized to `windows`, every row defaulted to `NaN`
    /// float columns and cell label `-1`, with per-layer write cursors
    /// initialized to each layer's `from`.
    pub fn preallocate(windows: &LayerWindows) -> Self {
        let n = windows.to.last().copied().unwrap_or(0);
        Self {
            azimuth: vec![f32::NAN; n],
            elevation: vec![f32::NAN; n],
            dbz: vec![f32::NAN; n],
            vrad: vec![f32::NAN; n],
            cell_label: vec![-1; n],
            gate_code: vec![0; n],
            cursor: windows.from.clone(),
        }
    }

    fn write(&mut self, row: usize, azimuth: f32, elevation: f32, dbz: f32, vrad: f32, cell_label: i32) {
        self.azimuth[row] = azimuth;
        self.elevation[row] = elevation;
        self.dbz[row] = dbz;
        self.vrad[row] = vrad;
        self.cell_label[row] = cell_label;
        self.gate_code[row] = 0;
    }
}

/// Row-index window `[from, to)` owned by each altitude layer. Immutable
/// once computed by [`size_layers`]; [`PointsTable`] tracks its own
/// per-layer write cursor separately so these bounds stay usable for
/// slicing after every scan has been appended.
#[derive(Debug, Clone, Default)]
pub struct LayerWindows {
    pub from: Vec<usize>,
    pub to: Vec<usize>,
}

fn gate_height(range: f32, elevation_deg: f32, radar_height: f32) -> f32 {
    const DEG2RAD: f32 = 0.017_453_293;
    range * (elevation_deg * DEG2RAD).sin() + radar_height
}

fn layer_of(height: f32, config: &Config) -> Option<usize> {
    if height < 0.0 {
        return None;
    }
    let layer = (height / config.h_layer) as usize;
    if layer < config.n_layer {
        Some(layer)
    } else {
        None
    }
}

/// Counts, per layer, how many gates across `scans` would be admitted by
/// the range/height inclusion test (ignoring azimuth, which does not affect
/// layer membership), so [`PointsTable`] can be allocated exactly once.
pub fn size_layers(scans: &[ScanMetadata], config: &Config) -> LayerWindows {
    let mut counts = vec![0usize; config.n_layer];

    for meta in scans {
        for i_ra in 0..meta.n_ra {
            let range = (i_ra as f32 + 0.5) * meta.range_scale;
            if range < config.range_min || range > config.range_max {
                continue;
            }
            let height = gate_height(range, meta.elevation_deg, meta.radar_height);
            if let Some(layer) = layer_of(height, config) {
                counts[layer] += meta.n_az;
            }
        }
    }

    let mut from = vec![0usize; config.n_layer];
    let mut to = vec![0usize; config.n_layer];
    let mut offset = 0usize;
    for layer in 0..config.n_layer {
        from[layer] = offset;
        offset += counts[layer];
        to[layer] = offset;
    }

    LayerWindows { from, to }
}

/// Appends one scan's admitted gates to `table`, writing each gate into its
/// layer's next free slot (tracked by `table`'s internal write cursor, not
/// `windows`, which stays fixed).
///
/// Admission test: range within `[range_min, range_max]`, azimuth within
/// `[azim_min, azim_max]` (no wraparound — see `Config::validate`), and the
/// computed gate height maps to one of the `config.n_layer` layers.
pub fn append_scan(
    table: &mut PointsTable,
    windows: &LayerWindows,
    vrad: &PolarImage,
    dbz: &PolarImage,
    labels: &CellLabelImage,
    config: &Config,
) -> Result<()> {
    let meta = dbz.meta;
    for i_az in 0..meta.n_az {
        let azimuth = i_az as f32 * meta.azimuth_scale_deg;
        if azimuth < config.azim_min || azimuth > config.azim_max {
            continue;
        }
        for i_ra in 0..meta.n_ra {
            let range = (i_ra as f32 + 0.5) * meta.range_scale;
            if range < config.range_min || range > config.range_max {
                continue;
            }
            let height = gate_height(range, meta.elevation_deg, meta.radar_height);
            let layer = match layer_of(height, config) {
                Some(l) => l,
                None => continue,
            };

            let dbz_value = dbz.get(i_az, i_ra).unwrap_or(f32::NAN);
            let vrad_value = vrad.get(i_az, i_ra).unwrap_or(f32::NAN);
            let cell_label = labels.data[[i_az, i_ra]];

            let row = table.cursor[layer];
            if row >= windows.to[layer] {
                return Err(VpProfileError::IndexOverflow(layer));
            }

            table.write(row, azimuth, meta.elevation_deg, dbz_value, vrad_value, cell_label);
            table.cursor[layer] = row + 1;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn meta() -> ScanMetadata {
        ScanMetadata {
            n_az: 4,
            n_ra: 4,
            range_scale: 2500.0,
            azimuth_scale_deg: 90.0,
            elevation_deg: 0.5,
            radar_height: 0.0,
            offset: -32.0,
            scale: 0.5,
            missing: 255,
        }
    }

    #[test]
    fn sizes_and_fills_within_window() {
        let m = meta();
        let config = Config {
            range_min: 0.0,
            range_max: 20000.0,
            n_layer: 5,
            h_layer: 200.0,
            ..Default::default()
        };
        let windows = size_layers(&[m], &config);
        let mut table = PointsTable::preallocate(&windows);

        let mut dbz = PolarImage::new(m);
        let mut vrad = PolarImage::new(m);
        for i_az in 0..4 {
            for i_ra in 0..4 {
                dbz.data[[i_az, i_ra]] = m.encode(10.0, 0).unwrap();
                vrad.data[[i_az, i_ra]] = m.encode(5.0, 0).unwrap();
            }
        }
        let labels = CellLabelImage {
            data: Array2::from_elem((4, 4), -1),
        };

        append_scan(&mut table, &windows, &vrad, &dbz, &labels, &config).unwrap();
        assert_eq!(table.len(), *windows.to.last().unwrap());
        assert!(table.dbz.iter().any(|v| !v.is_nan()));
    }

    #[test]
    fn overrunning_layer_window_errors() {
        let m = meta();
        let config = Config {
            range_min: 0.0,
            range_max: 20000.0,
            n_layer: 5,
            h_layer: 200.0,
            ..Default::default()
        };
        // Deliberately undersized windows to force an overrun.
        let windows = LayerWindows {
            from: vec![0; 5],
            to: vec![0; 5],
        };
        let mut table = PointsTable::preallocate(&windows);
        let mut dbz = PolarImage::new(m);
        let mut vrad = PolarImage::new(m);
        dbz.data[[0, 0]] = m.encode(10.0, 0).unwrap();
        vrad.data[[0, 0]] = m.encode(5.0, 0).unwrap();
        let labels = CellLabelImage {
            data: Array2::from_elem((4, 4), -1),
        };
        let err = append_scan(&mut table, &windows, &vrad, &dbz, &labels, &config);
        assert!(matches!(err, Err(VpProfileError::IndexOverflow(_))));
    }
}
