/// Georeferencing utilities (stub for future implementation)

use crate::{Result, VolumeData};

/// Georeference radar data (placeholder)
///
/// This will convert polar coordinates (azimuth, elevation, range) to
/// geographic coordinates (latitude, longitude, altitude).
pub fn georeference(volume: &VolumeData) -> Result<VolumeData> {
    // TODO: Implement georeferencing
    Ok(volume.clone())
}
