//! Top-level orchestrator: wires the per-scan pipeline (texture -> cell
//! finder -> cell analyzer -> fringe -> points assembly) and the
//! volume-wide gate classification and profile engine together.
//!
//! Grounded on `original_source/libvol2bird.c::vol2birdCalcProfiles`'s
//! setup half (the per-scan loop run before the profile loop itself, which
//! lives in `core::profile::run`).

use log::{debug, warn};

use crate::config::{constants, Config};
use crate::error::{Result, VpProfileError};

use super::cellanalyzer::{analyze_cells, grow_fringe};
use super::cellfinder::{find_weather_cells, CellLabelImage};
use super::classifier::classify;
use super::image::{PolarImage, ScanMetadata};
use super::points::{append_scan, size_layers, PointsTable};
use super::profile::{self, ProfileOutput};
use super::volume::PolarVolume;

/// The reflectivity moment name the core requires on every scan.
pub const DBZ_NAME: &str = "DBZH";
/// The radial-velocity moment name the core requires on every scan.
pub const VRAD_NAME: &str = "VRAD";
/// The optional static clutter map moment name, consulted by
/// [`analyze_cells`] only when [`Config::use_static_clutter_data`] is set.
pub const CLUTTER_NAME: &str = "CLUTTER";

/// Per-scan intermediate state carried from the scan loop into the
/// points-assembly pass: borrowed reflectivity/velocity images plus the
/// owned, fringe-grown cell label image computed for this scan.
struct ScanWork<'a> {
    dbz: &'a PolarImage,
    vrad: &'a PolarImage,
    labels: CellLabelImage,
}

/// Builds the texture image's encoding: offset 0, a scale generous enough
/// for realistic vrad textures (tens of m/s), the same missing sentinel
/// convention as the input images.
fn texture_meta(vrad: &ScanMetadata) -> ScanMetadata {
    ScanMetadata {
        offset: 0.0,
        scale: 0.1,
        missing: 255,
        ..*vrad
    }
}

/// Runs one scan through components C (texture), D (cell finder), E (cell
/// analyzer, fringe growth). Returns the fringe-grown label image for that
/// scan, to be consumed by F (points assembly) afterward.
///
/// A [`VpProfileError::CellFinderDegenerate`] from D is not fatal: per §7,
/// the scan's cell image is left empty (all gates unlabeled) and cell
/// analysis is skipped, since there is nothing to analyze.
fn process_scan<'a>(
    dbz: &'a PolarImage,
    vrad: &'a PolarImage,
    clutter: Option<&PolarImage>,
    config: &Config,
) -> Result<ScanWork<'a>> {
    let tex_meta = texture_meta(&vrad.meta);
    let tex = super::texture::calc_texture(
        vrad,
        dbz,
        tex_meta,
        constants::N_TEX_BIN_AZIM,
        constants::N_TEX_BIN_RANG,
        constants::N_TEX_MIN,
    )?;

    let labels = match find_weather_cells(dbz, config) {
        Ok((mut labels, n_raw)) => {
            debug!("cell finder assigned {n_raw} raw identifiers");
            let _props = analyze_cells(dbz, vrad, &tex, clutter, &mut labels, n_raw, config)?;
            grow_fringe(&mut labels, dbz, constants::FRINGE_DIST);
            labels
        }
        Err(VpProfileError::CellFinderDegenerate) => {
            warn!("cell finder threshold degenerate for this scan's encoding; no cells found");
            CellLabelImage {
                data: ndarray::Array2::from_elem((dbz.n_az(), dbz.n_ra()), -1),
            }
        }
        Err(e) => return Err(e),
    };

    Ok(ScanWork { dbz, vrad, labels })
}

/// Runs the full pipeline over `volume`, producing all three profile
/// variants.
///
/// Fails with [`VpProfileError::EmptyVolume`] if `volume` has no scans, and
/// with [`VpProfileError::MissingParameter`] if any scan lacks [`DBZ_NAME`]
/// or [`VRAD_NAME`].
pub fn run(volume: &PolarVolume, config: &Config) -> Result<ProfileOutput> {
    config.validate()?;

    if volume.scans.is_empty() {
        return Err(VpProfileError::EmptyVolume);
    }

    // Every scan must carry both required moments before any scan is
    // processed, so a late missing-parameter failure never leaves behind
    // partially-processed work.
    let mut checked = Vec::with_capacity(volume.scans.len());
    for scan in &volume.scans {
        let dbz = scan
            .get(DBZ_NAME)
            .ok_or_else(|| VpProfileError::MissingParameter(DBZ_NAME.to_string()))?;
        let vrad = scan
            .get(VRAD_NAME)
            .ok_or_else(|| VpProfileError::MissingParameter(VRAD_NAME.to_string()))?;
        let clutter = scan.get(CLUTTER_NAME);
        checked.push((dbz, vrad, clutter));
    }

    let mut work = Vec::with_capacity(checked.len());
    for (dbz, vrad, clutter) in checked {
        if config.verbose {
            debug!(
                "processing scan at elevation {:.2} deg ({} x {})",
                dbz.meta.elevation_deg,
                dbz.n_az(),
                dbz.n_ra()
            );
        }

        work.push(process_scan(dbz, vrad, clutter, config)?);
    }

    let metas: Vec<ScanMetadata> = work.iter().map(|w| w.dbz.meta).collect();
    let windows = size_layers(&metas, config);
    let mut table = PointsTable::preallocate(&windows);

    for scan in &work {
        append_scan(&mut table, &windows, scan.vrad, scan.dbz, &scan.labels, config)?;
    }

    classify(&mut table, config);

    Ok(profile::run(&mut table, &windows, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::image::PolarImage;
    use crate::core::volume::PolarScan;
    use std::collections::HashMap;
    use std::f32::consts::PI;

    fn scan_meta(n_az: usize, n_ra: usize, elevation_deg: f32) -> ScanMetadata {
        ScanMetadata {
            n_az,
            n_ra,
            range_scale: 50.0,
            azimuth_scale_deg: 360.0 / n_az as f32,
            elevation_deg,
            radar_height: 0.0,
            offset: -32.0,
            scale: 0.5,
            missing: 255,
        }
    }

    /// S6: a single uniform-dBZ scan with a synthetic uniform wind field
    /// recovers (u, v) in the layer near the beam height, all other layers
    /// NaN.
    #[test]
    fn end_to_end_smoke_recovers_uniform_wind() {
        let n_az = 360;
        let n_ra = 200;
        let elevation_deg = 5.0f32;
        let dbz_meta = scan_meta(n_az, n_ra, elevation_deg);
        let vrad_meta = ScanMetadata {
            offset: -32.0,
            scale: 0.25,
            ..dbz_meta
        };

        let mut dbz = PolarImage::new(dbz_meta);
        let mut vrad = PolarImage::new(vrad_meta);

        let (u, v) = (5.0f32, -3.0f32);
        for i_az in 0..n_az {
            let azimuth_rad = i_az as f32 * dbz_meta.azimuth_scale_deg * PI / 180.0;
            let elevation_rad = elevation_deg * PI / 180.0;
            let vrad_value =
                u * azimuth_rad.sin() * elevation_rad.cos() + v * azimuth_rad.cos() * elevation_rad.cos();
            for i_ra in 0..n_ra {
                dbz.data[[i_az, i_ra]] = dbz_meta.encode(10.0, 0).unwrap();
                vrad.data[[i_az, i_ra]] = vrad_meta.encode(vrad_value, 0).unwrap();
            }
        }

        let mut moments = HashMap::new();
        moments.insert(DBZ_NAME.to_string(), dbz);
        moments.insert(VRAD_NAME.to_string(), vrad);
        let scan = PolarScan {
            geometry: dbz_meta,
            moments,
        };
        let volume = PolarVolume { scans: vec![scan] };

        let config = Config {
            n_layer: 60,
            h_layer: 200.0,
            range_min: 0.0,
            range_max: 10000.0,
            neighbors: 1,
            ..Default::default()
        };

        let output = run(&volume, &config).unwrap();
        let table = output.table(vp_profile_types::ProfileVariant::BirdsAndCells);

        let expected_height = 10000.0 * elevation_deg.to_radians().sin();
        let expected_layer = (expected_height / config.h_layer) as usize;

        let hit = &table.rows[expected_layer];
        assert!(hit.u.is_finite(), "expected a fit near the beam height layer");
        assert!((hit.u - u).abs() < 0.5);
        assert!((hit.v - v).abs() < 0.5);
        assert!(hit.bird_density.is_nan()); // variant 2, not variant 1
    }

    #[test]
    fn empty_volume_is_rejected() {
        let config = Config::default();
        let volume = PolarVolume::new();
        let err = run(&volume, &config).unwrap_err();
        assert!(matches!(err, VpProfileError::EmptyVolume));
    }

    #[test]
    fn missing_parameter_is_rejected() {
        let config = Config::default();
        let dbz_meta = scan_meta(4, 4, 0.5);
        let mut moments = HashMap::new();
        moments.insert(DBZ_NAME.to_string(), PolarImage::new(dbz_meta));
        let scan = PolarScan {
            geometry: dbz_meta,
            moments,
        };
        let volume = PolarVolume { scans: vec![scan] };
        let err = run(&volume, &config).unwrap_err();
        assert!(matches!(err, VpProfileError::MissingParameter(name) if name == VRAD_NAME));
    }
}
