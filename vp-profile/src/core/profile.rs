//! The profile engine (component H): for each of the three profile
//! variants, in reverse order, and each altitude layer, selects admitted
//! points, fits the wind model via [`super::svd`], rejects outliers across
//! up to two passes, and computes reflectivity and bird density.

use vp_profile_types::ProfileVariant;

use crate::config::{constants, Config};
use crate::error::Result;

use super::classifier::GateCode;
use super::points::{LayerWindows, PointsTable};
use super::svd::{linear_fit, Basis, FitResult};

const DEG2RAD: f32 = std::f32::consts::PI / 180.0;
const RAD2DEG: f32 = 180.0 / std::f32::consts::PI;

/// The wind-vector basis `(azimuth, elevation)` (degrees) -> `(u, v, w)`
/// unit components: `sin(az)*cos(el), cos(az)*cos(el), sin(el)`.
///
/// A linear combination of these three components with the fitted
/// `(u, v, w)` parameters predicts the radial velocity observed at that
/// azimuth and elevation -- the VVP wind model.
pub struct WindBasis;

impl Basis for WindBasis {
    fn dims(&self) -> usize {
        2
    }

    fn n_params(&self) -> usize {
        3
    }

    fn evaluate(&self, point: &[f32], out: &mut [f32]) -> Result<()> {
        let azimuth_rad = point[0] * DEG2RAD;
        let elevation_rad = point[1] * DEG2RAD;
        out[0] = azimuth_rad.sin() * elevation_rad.cos();
        out[1] = azimuth_rad.cos() * elevation_rad.cos();
        out[2] = elevation_rad.sin();
        Ok(())
    }
}

/// The lifecycle state a layer's fit reached within one variant's pass loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerState {
    /// No pass has run yet.
    Pending,
    /// A fit was attempted but rejected (too few points, or reduced
    /// chi-square below [`constants::CHISQ_MIN`]); the row is NaN-filled.
    Insufficient,
    /// At least one pass produced an accepted fit.
    Fitted,
    /// The pass loop is done; the row is final (identical to `Fitted` for
    /// gap/no-fit layers, which never leave `Pending` otherwise).
    Finalized,
}

/// One row of a variant's profile: the 13 columns of §3's `ProfileRow`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileRow {
    pub alt_min: f32,
    pub alt_max: f32,
    pub u: f32,
    pub v: f32,
    pub w: f32,
    pub h_speed: f32,
    pub h_dir: f32,
    pub chi: f32,
    pub has_gap: bool,
    pub dbz_avg: f32,
    pub n_points_included: usize,
    pub reflectivity_eta: f32,
    pub bird_density: f32,
}

impl ProfileRow {
    fn nan(alt_min: f32, alt_max: f32) -> Self {
        Self {
            alt_min,
            alt_max,
            u: f32::NAN,
            v: f32::NAN,
            w: f32::NAN,
            h_speed: f32::NAN,
            h_dir: f32::NAN,
            chi: f32::NAN,
            has_gap: false,
            dbz_avg: f32::NAN,
            n_points_included: 0,
            reflectivity_eta: f32::NAN,
            bird_density: f32::NAN,
        }
    }
}

/// One variant's profile: one [`ProfileRow`] per altitude layer.
#[derive(Debug, Clone, Default)]
pub struct ProfileTable {
    pub rows: Vec<ProfileRow>,
}

fn variant_index(variant: ProfileVariant) -> usize {
    variant.number() as usize - 1
}

/// The complete output of one engine run: all three variants (indexed
/// `variant.number() - 1`, i.e. `[BirdsOnly, BirdsAndCells,
/// BirdsCellsAndFringe]`), plus the per-layer `scatterersAreNotBirds` flag
/// variant 3 derives and which a downstream consumer may use when
/// post-processing variant 1 -- §3 documents it as consulted "when
/// building variant 1", but (matching
/// `original_source/libvol2bird.c::vol2birdCalcProfiles`, which computes
/// and stores it without reading it back inside the same function) this
/// engine computes and exposes it without branching variant 1's own
/// per-layer processing on it; see `DESIGN.md`.
#[derive(Debug, Clone, Default)]
pub struct ProfileOutput {
    pub variants: [ProfileTable; 3],
    pub scatterers_are_not_birds: Vec<bool>,
}

impl ProfileOutput {
    pub fn table(&self, variant: ProfileVariant) -> &ProfileTable {
        &self.variants[variant_index(variant)]
    }

    fn table_mut(&mut self, variant: ProfileVariant) -> &mut ProfileTable {
        &mut self.variants[variant_index(variant)]
    }
}

/// Whether a gate carrying `gate_code` is admitted into `variant`.
///
/// Mirrors `original_source/libvol2bird.c::includeGate`'s bit-by-bit
/// cascade literally: each set bit, checked from position 0 upward,
/// unconditionally overwrites the running decision with that bit's
/// per-variant verdict, so the *highest-numbered* set bit decides the
/// final outcome rather than an AND across every set bit. This can admit
/// combinations the §4.H per-bit table's naive reading would not (e.g. a
/// point with both bit 1 and bit 4 set is admitted by variant 2 as well as
/// variant 3, since bit 4 -- the higher of the two -- is ✓ for both); see
/// `DESIGN.md`'s discussion of this against the spec's own S5 example.
fn include_gate(variant: ProfileVariant, gate_code: u32) -> bool {
    use ProfileVariant::{BirdsAndCells, BirdsCellsAndFringe, BirdsOnly};

    let verdict = |var1: bool, var2: bool, var3: bool| match variant {
        BirdsOnly => var1,
        BirdsAndCells => var2,
        BirdsCellsAndFringe => var3,
    };

    let mut include = true;
    for (bit, var1, var2, var3) in [
        (GateCode::STATIC_CLUTTER, false, false, false),
        (GateCode::DYNAMIC_CLUTTER, false, true, true),
        (GateCode::DYNAMIC_CLUTTER_FRINGE, false, false, true),
        (GateCode::VRAD_MISSING, false, false, false),
        (GateCode::DBZ_TOO_HIGH, false, true, true),
        (GateCode::VRAD_TOO_LOW, false, false, false),
        (GateCode::VRAD_OUTLIER, false, true, true),
        (GateCode::AZIMUTH_TOO_LOW, false, false, false),
        (GateCode::AZIMUTH_TOO_HIGH, false, false, false),
    ] {
        if gate_code & bit != 0 {
            include = verdict(var1, var2, var3);
        }
    }
    include
}

/// Bins selected azimuths into `constants::N_BINS_GAP` equal sectors and
/// reports whether any two cyclically-adjacent sectors both hold fewer
/// than `constants::N_OBS_GAP_MIN` observations.
fn has_azimuth_gap(azimuths: &[f32]) -> bool {
    let n_bins = constants::N_BINS_GAP;
    let mut counts = vec![0usize; n_bins];
    for &az in azimuths {
        let bin = ((az / 360.0 * n_bins as f32).floor() as isize).rem_euclid(n_bins as isize) as usize;
        counts[bin] += 1;
    }
    for bin in 0..n_bins {
        let next = (bin + 1) % n_bins;
        if counts[bin] < constants::N_OBS_GAP_MIN && counts[next] < constants::N_OBS_GAP_MIN {
            return true;
        }
    }
    false
}

/// Clears bit 6 ([`GateCode::VRAD_OUTLIER`]) across the whole table before
/// a variant's layer loop starts.
fn clear_outlier_bit(table: &mut PointsTable) {
    for code in table.gate_code.iter_mut() {
        *code &= !GateCode::VRAD_OUTLIER;
    }
}

struct Selection {
    indices: Vec<usize>,
    points: Vec<f32>,
    y_obs: Vec<f32>,
}

fn select(table: &PointsTable, from: usize, to: usize, variant: ProfileVariant) -> Selection {
    let mut indices = Vec::new();
    let mut points = Vec::new();
    let mut y_obs = Vec::new();
    for row in from..to {
        if table.azimuth[row].is_nan() {
            continue; // unwritten row within an under-filled layer window
        }
        if !include_gate(variant, table.gate_code[row]) {
            continue;
        }
        indices.push(row);
        points.push(table.azimuth[row]);
        points.push(table.elevation[row]);
        y_obs.push(table.vrad[row]);
    }
    Selection {
        indices,
        points,
        y_obs,
    }
}

#[allow(clippy::too_many_arguments)]
fn run_layer(
    table: &mut PointsTable,
    windows: &LayerWindows,
    layer: usize,
    variant: ProfileVariant,
    config: &Config,
) -> (ProfileRow, LayerState, Option<f32>) {
    let from = windows.from[layer];
    let to = windows.to[layer];
    let alt_min = layer as f32 * config.h_layer;
    let alt_max = (layer + 1) as f32 * config.h_layer;

    let n_passes = if config.fit_vrad { 2 } else { 1 };
    let basis = WindBasis;

    let mut row = ProfileRow::nan(alt_min, alt_max);
    let mut state = LayerState::Pending;
    let mut chi: Option<f32> = None;

    for _pass in 0..n_passes {
        let selection = select(table, from, to, variant);
        let n_included = selection.indices.len();

        let undbz_avg = if n_included > constants::N_DBZ_MIN {
            let sum: f64 = selection
                .y_obs
                .iter()
                .enumerate()
                .map(|(i, _)| 10f64.powf((table.dbz[selection.indices[i]] as f64) / 10.0))
                .sum();
            Some((sum / n_included as f64) as f32)
        } else {
            None
        };
        let dbz_avg = undbz_avg.map(|u| 10.0 * u.log10());
        let reflectivity = undbz_avg.map(|u| config.dbz_factor() * u).unwrap_or(f32::NAN);
        let bird_density = if variant == ProfileVariant::BirdsOnly {
            reflectivity / constants::SIGMA_BIRD
        } else {
            f32::NAN
        };

        let has_gap = has_azimuth_gap(&selection.points[..].chunks(2).map(|c| c[0]).collect::<Vec<_>>());

        row.dbz_avg = dbz_avg.unwrap_or(f32::NAN);
        row.reflectivity_eta = reflectivity;
        row.bird_density = bird_density;
        row.has_gap = has_gap;
        row.n_points_included = n_included;

        if !config.fit_vrad {
            state = LayerState::Finalized;
            break;
        }

        if n_included <= basis.n_params() || has_gap {
            state = LayerState::Insufficient;
            // No fit attempted this pass; outlier bits unchanged, so a
            // second pass (if any) sees the same selection and reaches the
            // same conclusion -- matches the original's behavior of
            // looping without updating flags when no fit was performed.
            continue;
        }

        let fit: Result<FitResult> = linear_fit(&selection.points, &basis, &selection.y_obs, n_included);
        let fit = match fit {
            Ok(f) => f,
            Err(e) => {
                log::warn!("wind fit did not converge for this layer/pass: {e}");
                state = LayerState::Insufficient;
                continue;
            }
        };

        if fit.chisq < constants::CHISQ_MIN {
            state = LayerState::Insufficient;
            continue;
        }

        let this_chi = fit.chisq.sqrt();
        row.u = fit.params[0];
        row.v = fit.params[1];
        row.w = fit.params[2];
        row.h_speed = (row.u * row.u + row.v * row.v).sqrt();
        let mut h_dir = row.u.atan2(row.v) * RAD2DEG;
        if h_dir < 0.0 {
            h_dir += 360.0;
        }
        row.h_dir = h_dir;
        row.chi = this_chi;
        chi = Some(this_chi);
        state = LayerState::Fitted;

        for (i_included, &row_idx) in selection.indices.iter().enumerate() {
            let abs_diff = (selection.y_obs[i_included] - fit.y_fit[i_included]).abs();
            if abs_diff > constants::VDIF_MAX {
                table.gate_code[row_idx] |= GateCode::VRAD_OUTLIER;
            }
        }
    }

    if state == LayerState::Pending {
        state = LayerState::Insufficient;
    }

    (row, state, chi)
}

/// Runs the profile engine over `table`: clears outlier bits, then computes
/// every layer of every variant in compute order (3, 2, 1), so variant 1
/// can consult variant 3's `scatterersAreNotBirds`.
pub fn run(table: &mut PointsTable, windows: &LayerWindows, config: &Config) -> ProfileOutput {
    let mut output = ProfileOutput {
        scatterers_are_not_birds: vec![false; config.n_layer],
        ..Default::default()
    };

    for variant in ProfileVariant::compute_order() {
        clear_outlier_bit(table);
        let mut rows = Vec::with_capacity(config.n_layer);
        for layer in 0..config.n_layer {
            let (row, _state, chi) = run_layer(table, windows, layer, variant, config);
            if variant == ProfileVariant::BirdsCellsAndFringe {
                output.scatterers_are_not_birds[layer] =
                    chi.map(|c| c < constants::STDEV_BIRD).unwrap_or(false);
            }
            rows.push(row);
        }
        *output.table_mut(variant) = ProfileTable { rows };
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn windows_for(n: usize) -> LayerWindows {
        LayerWindows {
            from: vec![0],
            to: vec![n],
        }
    }

    fn table_with_plane_wind(n_points: usize, u: f32, v: f32) -> PointsTable {
        let windows = windows_for(n_points);
        let mut table = PointsTable::preallocate(&windows);
        for i in 0..n_points {
            let azimuth = (i as f32 / n_points as f32) * 360.0;
            let elevation = 5.0f32;
            let az_rad = azimuth * DEG2RAD;
            let el_rad = elevation * DEG2RAD;
            let vrad = u * az_rad.sin() * el_rad.cos() + v * az_rad.cos() * el_rad.cos();
            table.azimuth[i] = azimuth;
            table.elevation[i] = elevation;
            table.dbz[i] = 10.0;
            table.vrad[i] = vrad;
            table.cell_label[i] = -1;
            table.gate_code[i] = 0;
        }
        table
    }

    #[test]
    fn recovers_uniform_wind_vector() {
        let mut table = table_with_plane_wind(60, 5.0, -3.0);
        let windows = windows_for(60);
        let config = Config {
            n_layer: 1,
            fit_vrad: true,
            ..Default::default()
        };
        let (row, state, _) = run_layer(&mut table, &windows, 0, ProfileVariant::BirdsOnly, &config);
        assert_eq!(state, LayerState::Fitted);
        assert!((row.u - 5.0).abs() < 0.1);
        assert!((row.v - (-3.0)).abs() < 0.1);
        assert!(row.reflectivity_eta.is_finite());
        assert!(row.bird_density.is_finite());
    }

    #[test]
    fn gap_detection_flags_adjacent_empty_sectors() {
        // Sectors 0,1,2,3 get 10 each, sector 5 gets 10, 4/6/7 empty.
        let mut azimuths = Vec::new();
        for sector in [0, 1, 2, 3, 5] {
            for _ in 0..10 {
                azimuths.push(sector as f32 * 45.0 + 1.0);
            }
        }
        assert!(has_azimuth_gap(&azimuths));

        // Redistribute one sample into sector 7: still a gap (sector 6 empty).
        azimuths.pop();
        azimuths.push(7.0 * 45.0 + 1.0);
        assert!(has_azimuth_gap(&azimuths));

        // Every sector >= 5: no gap.
        let full: Vec<f32> = (0..8).flat_map(|s| vec![s as f32 * 45.0 + 1.0; 5]).collect();
        assert!(!has_azimuth_gap(&full));
    }

    #[test]
    fn variant_gating_matches_bit4_only_example() {
        // S5: a point with only bit 4 (dBZTooHigh) set is excluded from
        // variant 1 and admitted by variants 2 and 3.
        let code = GateCode::DBZ_TOO_HIGH;
        assert!(!include_gate(ProfileVariant::BirdsOnly, code));
        assert!(include_gate(ProfileVariant::BirdsAndCells, code));
        assert!(include_gate(ProfileVariant::BirdsCellsAndFringe, code));
    }

    #[test]
    fn too_few_points_is_insufficient_not_an_error() {
        let mut table = table_with_plane_wind(2, 5.0, -3.0);
        let windows = windows_for(2);
        let config = Config {
            n_layer: 1,
            ..Default::default()
        };
        let (row, state, _) = run_layer(&mut table, &windows, 0, ProfileVariant::BirdsOnly, &config);
        assert_eq!(state, LayerState::Insufficient);
        assert!(row.u.is_nan());
    }
}
