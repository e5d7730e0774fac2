//! End-to-end integration test: an ingestion-model `SweepData` (the shape
//! `backends::CfRadial1Backend` produces) bridged through
//! `PolarScan::from_sweep` into the profiling core, recovering a known wind
//! field. Exercises the full chain named in the crate's design docs.

use std::collections::HashMap;
use std::f32::consts::PI;

use ndarray::Array2;
use vp_profile::model::{Coordinates, MomentData, SweepData, SweepMetadata};
use vp_profile::{Config, PolarScan, PolarVolume};
use vp_profile_types::{ProfileVariant, SweepMode};

fn uniform_wind_sweep(n_az: usize, n_ra: usize, elevation_deg: f32, u: f32, v: f32) -> SweepData {
    let range: Vec<f32> = (0..n_ra).map(|i| 50.0 + i as f32 * 50.0).collect();
    let azimuth: Vec<f32> = (0..n_az).map(|i| i as f32 * 360.0 / n_az as f32).collect();
    let elevation = vec![elevation_deg; n_az];
    let time = vec![0.0; n_az];
    let coordinates = Coordinates::new(time, range, azimuth.clone(), elevation);

    let mut dbz = Array2::<f32>::from_elem((n_az, n_ra), 10.0);
    let mut vrad = Array2::<f32>::zeros((n_az, n_ra));
    let elevation_rad = elevation_deg * PI / 180.0;
    for (i_az, &az_deg) in azimuth.iter().enumerate() {
        let az_rad = az_deg * PI / 180.0;
        let value = u * az_rad.sin() * elevation_rad.cos() + v * az_rad.cos() * elevation_rad.cos();
        for i_ra in 0..n_ra {
            vrad[[i_az, i_ra]] = value;
            dbz[[i_az, i_ra]] = 10.0;
        }
    }

    let mut dbz_moment = MomentData::new("DBZH".to_string(), "dBZ".to_string(), dbz);
    dbz_moment.scale_factor = Some(0.5);
    dbz_moment.add_offset = Some(-32.0);
    let mut vrad_moment = MomentData::new("VRAD".to_string(), "m/s".to_string(), vrad);
    vrad_moment.scale_factor = Some(0.25);
    vrad_moment.add_offset = Some(-32.0);

    let mut moments = HashMap::new();
    moments.insert("DBZH".to_string(), dbz_moment);
    moments.insert("VRAD".to_string(), vrad_moment);

    let metadata = SweepMetadata::new(0, SweepMode::Azimuth, elevation_deg as f64);
    SweepData::new(metadata, moments, coordinates)
}

#[test]
fn sweep_through_core_recovers_uniform_wind() {
    let (u, v) = (6.0f32, 2.0f32);
    let elevation_deg = 8.0f32;
    let sweep = uniform_wind_sweep(360, 200, elevation_deg, u, v);
    let scan = PolarScan::from_sweep(&sweep, "DBZH", "VRAD").expect("re-quantizing a decoded sweep should not fail");
    let volume = PolarVolume { scans: vec![scan] };

    let config = Config {
        n_layer: 50,
        h_layer: 200.0,
        range_min: 0.0,
        range_max: 10_000.0,
        neighbors: 1,
        ..Default::default()
    };

    let output = vp_profile::run(&volume, &config).expect("pipeline should succeed on a clean synthetic sweep");
    let table = output.table(ProfileVariant::BirdsAndCells);

    let expected_height = 10_000.0 * elevation_deg.to_radians().sin();
    let expected_layer = (expected_height / config.h_layer) as usize;

    let row = &table.rows[expected_layer];
    assert!(row.u.is_finite(), "expected a fit near the beam height layer");
    assert!((row.u - u).abs() < 0.5);
    assert!((row.v - v).abs() < 0.5);
}
