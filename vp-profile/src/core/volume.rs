//! The profiling core's own volume input type, and the adapter that builds
//! one from the CfRadial1 ingestion model.

use crate::error::{Result, VpProfileError};
use crate::model::SweepData;

use super::image::{PolarImage, ScanMetadata};

/// One elevation scan: a named set of [`PolarImage`]s sharing one geometry.
#[derive(Debug, Clone)]
pub struct PolarScan {
    /// Scan geometry shared by every image in `moments`, for convenience.
    /// Individual images may still carry their own `offset`/`scale`/`missing`.
    pub geometry: ScanMetadata,
    /// Named encoded-byte images, e.g. `"DBZH"`, `"VRAD"`.
    pub moments: std::collections::HashMap<String, PolarImage>,
}

impl PolarScan {
    /// Looks up a named image.
    pub fn get(&self, name: &str) -> Option<&PolarImage> {
        self.moments.get(name)
    }

    /// Builds a `PolarScan` from an already-decoded ingestion-model sweep by
    /// re-quantizing the named reflectivity and velocity moments back to
    /// encoded bytes, so a volume read through `backends::CfRadial1Backend`
    /// can be handed to the profiling core.
    ///
    /// `missing` is the byte sentinel to use for the re-encoded images;
    /// each moment's own scale/offset are derived from the observed value
    /// range when the source doesn't carry one.
    pub fn from_sweep(sweep: &SweepData, dbz_name: &str, vrad_name: &str) -> Result<Self> {
        let dbz = sweep
            .get_moment(dbz_name)
            .ok_or_else(|| VpProfileError::MissingParameter(dbz_name.to_string()))?;
        let vrad = sweep
            .get_moment(vrad_name)
            .ok_or_else(|| VpProfileError::MissingParameter(vrad_name.to_string()))?;

        let n_az = sweep.num_rays();
        let n_ra = sweep.num_gates();
        let range_scale = if n_ra > 1 {
            sweep.coordinates.range[1] - sweep.coordinates.range[0]
        } else {
            1.0
        };
        let azimuth_scale_deg = if n_az > 1 {
            sweep.coordinates.azimuth[1] - sweep.coordinates.azimuth[0]
        } else {
            1.0
        };
        let elevation_deg = sweep.metadata.fixed_angle as f32;

        let mut moments = std::collections::HashMap::new();
        for (name, moment) in [(dbz_name, dbz), (vrad_name, vrad)] {
            let geometry = ScanMetadata {
                n_az,
                n_ra,
                range_scale,
                azimuth_scale_deg,
                elevation_deg,
                radar_height: 0.0,
                offset: moment.add_offset.unwrap_or(0.0),
                scale: moment.scale_factor.unwrap_or(1.0),
                missing: 255,
            };
            let mut image = PolarImage::new(geometry);
            for i_az in 0..n_az {
                for i_ra in 0..n_ra {
                    let value = moment.data[[i_az, i_ra]];
                    if let Some(fill) = moment.fill_value {
                        if value == fill {
                            continue;
                        }
                    }
                    let gate = image.flat_index(i_az, i_ra);
                    image.data[[i_az, i_ra]] = geometry.encode(value, gate)?;
                }
            }
            moments.insert(name.to_string(), image);
        }

        let geometry = moments.values().next().unwrap().meta;
        Ok(Self { geometry, moments })
    }
}

/// An ordered sequence of elevation scans: the profiling core's input.
#[derive(Debug, Clone, Default)]
pub struct PolarVolume {
    /// Scans, lowest elevation first by convention (not enforced).
    pub scans: Vec<PolarScan>,
}

impl PolarVolume {
    /// An empty volume.
    pub fn new() -> Self {
        Self { scans: Vec::new() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_volume_has_no_scans() {
        assert_eq!(PolarVolume::new().scans.len(), 0);
    }
}
