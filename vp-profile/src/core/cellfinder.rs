//! Connected-component labeling of the weather-cell candidates in a dBZ
//! image, with azimuth wraparound at the polar seam.

use ndarray::Array2;

use crate::config::Config;
use crate::error::{Result, VpProfileError};

use super::geometry::nearby_index;
use super::image::PolarImage;

/// A labeled polar grid: `-1` = not part of any cell, `0..` = raw cell
/// identifier (not yet area-sorted; see [`super::cellanalyzer::analyze_cells`]).
#[derive(Debug, Clone)]
pub struct CellLabelImage {
    /// `[n_az, n_ra]` grid of raw cell identifiers, `-1` for none.
    pub data: Array2<i32>,
}

impl CellLabelImage {
    fn filled(n_az: usize, n_ra: usize, value: i32) -> Self {
        Self {
            data: Array2::from_elem((n_az, n_ra), value),
        }
    }
}

const N_NEIGHBORHOOD: usize = 9; // 3x3
const N_HALF_NEIGHBORHOOD: usize = (N_NEIGHBORHOOD - 1) / 2;

/// Finds weather cells in `dbz` by thresholding at `config.dbz_thres_min()`
/// and growing 8-connected regions, including across the azimuth seam.
///
/// Returns the label image and the number of raw cell identifiers assigned
/// (some may end up empty after merges; `cellanalyzer` renumbers them).
pub fn find_weather_cells(dbz: &PolarImage, config: &Config) -> Result<(CellLabelImage, usize)> {
    let n_az = dbz.n_az();
    let n_ra = dbz.n_ra();

    let dbz_thres_min = config.dbz_thres_min();
    let dbz_thres = match dbz.meta.encode(dbz_thres_min, 0) {
        Ok(t) => t,
        Err(_) => return Err(VpProfileError::CellFinderDegenerate),
    };
    if dbz_thres == dbz.meta.missing {
        return Err(VpProfileError::CellFinderDegenerate);
    }

    let r_cell_max = config.range_max + 5000.0;

    let mut labels = CellLabelImage::filled(n_az, n_ra, -1);
    let mut next_id = 0i32;

    for i_az in 0..n_az {
        for i_ra in 0..n_ra {
            if (i_ra as f32 + 1.0) * dbz.meta.range_scale > r_cell_max {
                continue;
            }
            let raw = dbz.raw(i_az, i_ra);
            if raw == dbz.meta.missing || raw < dbz_thres {
                continue;
            }

            let i_global = dbz.flat_index(i_az, i_ra);

            let mut count = 0usize;
            for i_nbh in 0..N_NEIGHBORHOOD {
                if let Ok(i_local) = nearby_index(n_az, n_ra, i_global, 3, 3, i_nbh) {
                    let (la, lr) = (i_local / n_ra, i_local % n_ra);
                    if dbz.raw(la, lr) > dbz_thres {
                        count += 1;
                    }
                }
            }
            if count < 1 || count - 1 < config.neighbors {
                continue;
            }

            for i_nbh in 0..N_HALF_NEIGHBORHOOD {
                let i_local = match nearby_index(n_az, n_ra, i_global, 3, 3, i_nbh) {
                    Ok(idx) => idx,
                    Err(_) => continue,
                };
                let (la, lr) = (i_local / n_ra, i_local % n_ra);
                let neighbor_label = labels.data[[la, lr]];
                if neighbor_label == -1 {
                    continue;
                }
                let current_label = labels.data[[i_az, i_ra]];
                if current_label == -1 {
                    labels.data[[i_az, i_ra]] = neighbor_label;
                } else if current_label != neighbor_label {
                    // merge: rewrite all occurrences of current_label to neighbor_label
                    labels.data.mapv_inplace(|v| {
                        if v == current_label {
                            neighbor_label
                        } else {
                            v
                        }
                    });
                }
            }

            if labels.data[[i_az, i_ra]] == -1 {
                labels.data[[i_az, i_ra]] = next_id;
                next_id += 1;
            }
        }
    }

    // Stitch the azimuth seam: ray 0 is adjacent to ray n_az-1.
    for i_ra in 0..n_ra {
        let i_global = dbz.flat_index(0, i_ra);
        if let Ok(i_other) = nearby_index(n_az, n_ra, i_global, 3, 3, 1) {
            let (oa, or_) = (i_other / n_ra, i_other % n_ra);
            let here = labels.data[[0, i_ra]];
            let there = labels.data[[oa, or_]];
            if here != -1 && there != -1 && here != there {
                labels.data.mapv_inplace(|v| if v == there { here } else { v });
            }
        }
    }

    Ok((labels, next_id as usize))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::image::ScanMetadata;

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
    fn finds_a_single_blob() {
        let m = meta();
        let mut dbz = PolarImage::new(m);
        for i_az in 2..5 {
            for i_ra in 2..5 {
                dbz.data[[i_az, i_ra]] = m.encode(30.0, 0).unwrap();
            }
        }
        let config = Config {
            neighbors: 1,
            ..Default::default()
        };
        let (labels, _n) = find_weather_cells(&dbz, &config).unwrap();
        let center_label = labels.data[[3, 3]];
        assert!(center_label >= 0);
        assert_eq!(labels.data[[0, 0]], -1);
    }

    #[test]
    fn degenerate_threshold_errors() {
        let mut m = meta();
        m.offset = 0.0;
        m.scale = 1.0;
        m.missing = 0; // DBZ_MIN (-100) encodes to a raw value that collides with missing
        let dbz = PolarImage::new(m);
        let config = Config::default();
        let err = find_weather_cells(&dbz, &config);
        assert!(err.is_err());
    }
}
