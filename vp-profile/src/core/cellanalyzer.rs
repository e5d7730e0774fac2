//! Per-cell statistics, the drop decision, area-based renumbering, and
//! fringe growth around surviving weather cells.

use crate::config::{self, Config};
use crate::error::Result;

use super::cellfinder::CellLabelImage;
use super::geometry::{great_circle_distance, nearby_index};
use super::image::PolarImage;

/// Accumulated statistics for one raw cell identifier, produced by
/// [`analyze_cells`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellProperty {
    /// Raw cell identifier this property describes (as assigned by
    /// [`super::cellfinder::find_weather_cells`]).
    pub index: i32,
    /// Total gates making up the cell.
    pub n_gates: usize,
    /// Of those, how many were flagged as clutter.
    pub n_gates_clutter: usize,
    /// Mean dBZ over the cell's non-clutter gates.
    pub dbz_avg: f32,
    /// Mean texture over the cell's non-clutter gates.
    pub tex_avg: f32,
    /// Coefficient of variation of dBZ over the cell (`stdev / mean`).
    pub cv: f32,
    /// Whether the cell failed the area/reflectivity/texture/clutter test
    /// and should be excluded from the final labeling.
    pub drop: bool,
}

impl CellProperty {
    fn new(index: i32) -> Self {
        Self {
            index,
            n_gates: 0,
            n_gates_clutter: 0,
            dbz_avg: 0.0,
            tex_avg: 0.0,
            cv: 0.0,
            drop: false,
        }
    }
}

/// Renumbering label written to a gate that was grown into a weather-cell
/// fringe but was not itself part of the seed region. The classifier's
/// "gate belongs to a fringe" bit checks a different value (`2`), following
/// the original algorithm's own documented inconsistency between its
/// fringe-labeling pass and its gate-classification pass; see `DESIGN.md`.
pub const FRINGE_LABEL: i32 = 0;

/// Label meaning "not part of any weather cell".
pub const NONE_LABEL: i32 = -1;

/// Computes per-cell statistics, drops cells that don't meet the area,
/// reflectivity, texture, and clutter-fraction criteria, and renumbers the
/// surviving cells in descending order of area, starting at `1`.
///
/// Returns one [`CellProperty`] per surviving cell, indexed by its *new*
/// label minus one.
pub fn analyze_cells(
    dbz: &PolarImage,
    vrad: &PolarImage,
    tex: &PolarImage,
    clutter: Option<&PolarImage>,
    labels: &mut CellLabelImage,
    n_raw_cells: usize,
    config: &Config,
) -> Result<Vec<CellProperty>> {
    let n_az = dbz.n_az();
    let n_ra = dbz.n_ra();

    let mut props: Vec<CellProperty> = (0..n_raw_cells as i32).map(CellProperty::new).collect();
    let mut dbz_sum = vec![0.0f64; n_raw_cells];
    let mut dbz_sq_sum = vec![0.0f64; n_raw_cells];
    let mut tex_sum = vec![0.0f64; n_raw_cells];

    for i_az in 0..n_az {
        for i_ra in 0..n_ra {
            let raw_label = labels.data[[i_az, i_ra]];
            if raw_label < 0 {
                continue;
            }
            let cell = &mut props[raw_label as usize];

            let is_clutter = match vrad.get(i_az, i_ra) {
                Some(v) if v.abs() < config::constants::VRAD_MIN => true,
                None => true,
                _ => {
                    config.use_static_clutter_data
                        && clutter
                            .and_then(|c| c.get(i_az, i_ra))
                            .map(|c| c > config::constants::DBZ_CLUTTER)
                            .unwrap_or(false)
                }
            };

            cell.n_gates += 1;
            if is_clutter {
                cell.n_gates_clutter += 1;
                continue;
            }

            if let Some(d) = dbz.get(i_az, i_ra) {
                dbz_sum[raw_label as usize] += d as f64;
                dbz_sq_sum[raw_label as usize] += (d as f64) * (d as f64);
            }
            if let Some(t) = tex.get(i_az, i_ra) {
                tex_sum[raw_label as usize] += t as f64;
            }
        }
    }

    for cell in props.iter_mut() {
        let n_non_clutter = (cell.n_gates - cell.n_gates_clutter).max(1) as f64;
        let mean = dbz_sum[cell.index as usize] / n_non_clutter;
        let var = (dbz_sq_sum[cell.index as usize] / n_non_clutter) - mean * mean;
        cell.dbz_avg = mean as f32;
        cell.tex_avg = (tex_sum[cell.index as usize] / n_non_clutter) as f32;
        cell.cv = if mean.abs() > f64::EPSILON {
            (var.max(0.0).sqrt() / mean.abs()) as f32
        } else {
            0.0
        };

        let clutter_fraction = cell.n_gates_clutter as f32 / cell.n_gates.max(1) as f32;
        cell.drop = cell.n_gates < config::constants::AREA_CELL
            || (cell.dbz_avg < config::constants::DBZ_CELL
                && cell.tex_avg > config::constants::STDEV_CELL
                && clutter_fraction < config::constants::CLUT_PERC_CELL);
    }

    // Sort surviving cells by descending area (dropped cells sort last,
    // with effective area zero) and renumber starting at 1.
    let mut order: Vec<usize> = (0..props.len()).collect();
    order.sort_by(|&a, &b| {
        let area_a = if props[a].drop { 0 } else { props[a].n_gates };
        let area_b = if props[b].drop { 0 } else { props[b].n_gates };
        area_b.cmp(&area_a)
    });

    let mut new_label_of = vec![NONE_LABEL; props.len()];
    let mut next_label = 1i32;
    for &raw in &order {
        if props[raw].drop {
            continue;
        }
        new_label_of[raw] = next_label;
        next_label += 1;
    }

    labels.data.mapv_inplace(|v| {
        if v < 0 {
            NONE_LABEL
        } else {
            new_label_of[v as usize]
        }
    });

    let surviving: Vec<CellProperty> = order
        .into_iter()
        .map(|raw| props[raw])
        .filter(|c| !c.drop)
        .collect();

    Ok(surviving)
}

/// Grows the boundary of every surviving weather cell outward by
/// `fringe_dist` meters, writing [`FRINGE_LABEL`] into gates that are
/// within range of a cell but were not themselves part of it.
pub fn grow_fringe(labels: &mut CellLabelImage, dbz: &PolarImage, fringe_dist: f32) {
    let n_az = dbz.n_az();
    let n_ra = dbz.n_ra();
    let range_scale = dbz.meta.range_scale;
    let azimuth_scale_deg = dbz.meta.azimuth_scale_deg;

    let original = labels.data.clone();

    for i_az in 0..n_az {
        for i_ra in 0..n_ra {
            if original[[i_az, i_ra]] >= 1 {
                continue; // already part of a cell
            }

            // Angular half-width of the search window at this range: the
            // number of rays subtended by fringe_dist along the local
            // circumference, at least one ray wide.
            let range = (i_ra as f32 + 0.5) * range_scale;
            let circumference = 2.0 * std::f32::consts::PI * range.max(range_scale);
            let a_block = ((fringe_dist / circumference) * n_az as f32)
                .ceil()
                .max(1.0) as usize;
            let r_block = ((fringe_dist / range_scale).ceil().max(1.0)) as usize;

            let i_global = dbz.flat_index(i_az, i_ra);
            let mut found = false;

            for d_az in 0..=(2 * a_block) {
                if found {
                    break;
                }
                for d_ra in 0..=(2 * r_block) {
                    let n_az_child = 2 * a_block + 1;
                    let n_ra_child = 2 * r_block + 1;
                    let i_child = d_az * n_ra_child + d_ra;
                    let i_local = match nearby_index(
                        n_az, n_ra, i_global, n_az_child, n_ra_child, i_child,
                    ) {
                        Ok(idx) => idx,
                        Err(_) => continue,
                    };
                    let (la, lr) = (i_local / n_ra, i_local % n_ra);
                    if original[[la, lr]] < 1 {
                        continue;
                    }
                    let dist =
                        great_circle_distance(i_ra, i_az, lr, la, range_scale, azimuth_scale_deg);
                    if dist <= fringe_dist {
                        found = true;
                        break;
                    }
                }
            }

            if found {
                labels.data[[i_az, i_ra]] = FRINGE_LABEL;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::image::ScanMetadata;
    use ndarray::Array2;

    fn meta() -> ScanMetadata {
        ScanMetadata {
            n_az: 8,
            n_ra: 8,
            range_scale: 250.0,
            azimuth_scale_deg: 45.0,
            elevation_deg: 0.5,
            radar_height: 0.0,
            offset: -100.0,
            scale: 1.0,
            missing: 255,
        }
    }

    #[test]
    fn small_cell_is_dropped() {
        let m = meta();
        let dbz = PolarImage::new(m);
        let vrad = {
            let mut v = PolarImage::new(m);
            for i_az in 0..8 {
                for i_ra in 0..8 {
                    v.data[[i_az, i_ra]] = m.encode(5.0, 0).unwrap();
                }
            }
            v
        };
        let tex = PolarImage::new(m);
        let mut labels = CellLabelImage {
            data: Array2::from_elem((8, 8), -1),
        };
        labels.data[[3, 3]] = 0; // single-gate cell, raw id 0
        let config = Config::default();

        let props = analyze_cells(&dbz, &vrad, &tex, None, &mut labels, 1, &config).unwrap();
        assert!(props.is_empty());
        assert_eq!(labels.data[[3, 3]], -1);
    }

    #[test]
    fn surviving_cell_renumbered_from_one() {
        let m = meta();
        let mut dbz = PolarImage::new(m);
        let mut vrad = PolarImage::new(m);
        let tex = PolarImage::new(m);
        let mut labels = CellLabelImage {
            data: Array2::from_elem((8, 8), -1),
        };
        for i_az in 2..6 {
            for i_ra in 2..6 {
                dbz.data[[i_az, i_ra]] = m.encode(25.0, 0).unwrap();
                vrad.data[[i_az, i_ra]] = m.encode(5.0, 0).unwrap();
                labels.data[[i_az, i_ra]] = 0;
            }
        }
        let config = Config::default();
        let props = analyze_cells(&dbz, &vrad, &tex, None, &mut labels, 1, &config).unwrap();
        assert_eq!(props.len(), 1);
        assert_eq!(labels.data[[3, 3]], 1);
    }

    #[test]
    fn fringe_grows_around_a_cell_without_overwriting_it() {
        let m = meta();
        let dbz = PolarImage::new(m);
        let mut labels = CellLabelImage {
            data: Array2::from_elem((8, 8), -1),
        };
        labels.data[[3, 3]] = 1;
        grow_fringe(&mut labels, &dbz, 5000.0);
        assert_eq!(labels.data[[3, 3]], 1);
        assert_eq!(labels.data[[3, 4]], FRINGE_LABEL);
    }
}
