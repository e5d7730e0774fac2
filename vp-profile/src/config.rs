//! External configuration for the vertical-profile engine: the tunable
//! parameters an operator supplies, plus the derived constants compiled in
//! from the original algorithm's defaults.

use serde::{Deserialize, Serialize};

use crate::error::{Result, VpProfileError};

/// Compiled-in derived constants (`original_source/constants.h`). Exposed
/// as `pub const`s rather than `Config` fields since nothing in the spec
/// calls for overriding them at runtime; tests that need different values
/// construct their own `Config` with the relevant field substituted.
pub mod constants {
    /// Minimum cell area, in gates.
    pub const AREA_CELL: usize = 4;
    /// Minimum reduced chi-square for a layer's fit to be accepted.
    pub const CHISQ_MIN: f32 = 1e-5;
    /// Maximum fraction of clutter gates tolerated in a cell.
    pub const CLUT_PERC_CELL: f32 = 0.5;
    /// Minimum average dBZ for a cell to be kept.
    pub const DBZ_CELL: f32 = 15.0;
    /// Static-clutter-map dBZ threshold.
    pub const DBZ_CLUTTER: f32 = -10.0;
    /// Maximum dBZ admitted into the profile's reflectivity average.
    pub const DBZ_MAX: f32 = 20.0;
    /// Minimum dBZ admitted anywhere (also the cell-finder threshold).
    pub const DBZ_MIN: f32 = -100.0;
    /// Distance, in meters, a weather cell is grown by.
    pub const FRINGE_DIST: f32 = 5000.0;
    /// Number of azimuth sectors used by the gap test.
    pub const N_BINS_GAP: usize = 8;
    /// Minimum number of points included for a layer's fit to proceed.
    pub const N_DBZ_MIN: usize = 25;
    /// Minimum direct 8-neighbors above threshold for cell-finder seeding.
    pub const NEIGHBORS: usize = 5;
    /// Minimum observations per sector for the gap test.
    pub const N_OBS_GAP_MIN: usize = 5;
    /// Azimuth neighborhood width used by the texture computation.
    pub const N_TEX_BIN_AZIM: usize = 3;
    /// Range neighborhood width used by the texture computation.
    pub const N_TEX_BIN_RANG: usize = 3;
    /// Minimum valid neighbors for a texture value to be computed.
    pub const N_TEX_MIN: usize = 4;
    /// Refractive index of water, used in the dBZ-to-reflectivity factor.
    pub const REFRACTIVE_INDEX_OF_WATER: f32 = 0.964;
    /// Bird radar cross-section, in cm^2.
    pub const SIGMA_BIRD: f32 = 11.0;
    /// Maximum average texture for a cell to be kept.
    pub const STDEV_CELL: f32 = 5.0;
    /// Chi threshold below which a layer's scatterers are assumed not to be birds.
    pub const STDEV_BIRD: f32 = 2.0;
    /// Maximum admitted deviation from the fitted vrad before a gate is an outlier.
    pub const VDIF_MAX: f32 = 10.0;
    /// Minimum |vrad| admitted as a non-clutter observation.
    pub const VRAD_MIN: f32 = 1.0;
}

/// External configuration for a single profile run.
///
/// Field names and defaults follow `original_source/constants.h` and the
/// `vol2bird` options file; most are read-only tuning knobs, so the
/// derived constants in [`constants`] are not duplicated here unless a
/// test needs to override one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Altitude-layer thickness, in meters.
    pub h_layer: f32,
    /// Number of altitude layers in the profile.
    pub n_layer: usize,
    /// Minimum gate range admitted into the points table, in meters.
    pub range_min: f32,
    /// Maximum gate range admitted into the points table, in meters.
    pub range_max: f32,
    /// Minimum admitted azimuth, in degrees.
    pub azim_min: f32,
    /// Maximum admitted azimuth, in degrees.
    pub azim_max: f32,
    /// Radar wavelength, in centimeters.
    pub radar_wavelength_cm: f32,
    /// Whether a static clutter map should be consulted during cell analysis.
    pub use_static_clutter_data: bool,
    /// Whether the linear wind fit is attempted at all.
    pub fit_vrad: bool,
    /// Emit `log::debug!`/`log::trace!` diagnostic records during processing.
    pub verbose: bool,

    /// Minimum direct 8-neighbors above threshold for cell-finder seeding.
    /// Broken out of [`constants::NEIGHBORS`] because tests shrink it to
    /// exercise small synthetic images.
    pub neighbors: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            h_layer: 200.0,
            n_layer: 30,
            range_min: 5000.0,
            range_max: 25000.0,
            azim_min: 0.0,
            azim_max: 360.0,
            radar_wavelength_cm: 5.3,
            use_static_clutter_data: false,
            fit_vrad: true,
            verbose: false,
            neighbors: constants::NEIGHBORS,
        }
    }
}

impl Config {
    /// Validates the configuration, returning
    /// [`VpProfileError::ConfigInvalid`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.h_layer <= 0.0 {
            return Err(VpProfileError::ConfigInvalid(
                "h_layer must be positive".into(),
            ));
        }
        if self.n_layer == 0 {
            return Err(VpProfileError::ConfigInvalid(
                "n_layer must be at least 1".into(),
            ));
        }
        if self.range_min < 0.0 || self.range_max <= self.range_min {
            return Err(VpProfileError::ConfigInvalid(
                "range_min must be non-negative and less than range_max".into(),
            ));
        }
        if self.azim_min < 0.0 || self.azim_max > 360.0 || self.azim_min > self.azim_max {
            return Err(VpProfileError::ConfigInvalid(
                "azimuth bounds must satisfy 0 <= azim_min <= azim_max <= 360".into(),
            ));
        }
        if self.radar_wavelength_cm <= 0.0 {
            return Err(VpProfileError::ConfigInvalid(
                "radar_wavelength_cm must be positive".into(),
            ));
        }
        Ok(())
    }

    /// The dBZ threshold the cell finder seeds connected components from.
    /// Equal to [`constants::DBZ_MIN`] in the original algorithm -- a very
    /// permissive threshold, deliberately; `analyze_cells` does the real
    /// filtering by average dBZ and texture afterward.
    pub fn dbz_thres_min(&self) -> f32 {
        constants::DBZ_MIN
    }

    /// Reflectivity-factor conversion constant: `dBZ` to `Z` to reflectivity.
    pub fn dbz_factor(&self) -> f32 {
        let refrac = constants::REFRACTIVE_INDEX_OF_WATER;
        (refrac * refrac * 1000.0 * std::f32::consts::PI.powi(5))
            / self.radar_wavelength_cm.powi(4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn rejects_inverted_range() {
        let config = Config {
            range_min: 30000.0,
            range_max: 5000.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_layers() {
        let config = Config {
            n_layer: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
