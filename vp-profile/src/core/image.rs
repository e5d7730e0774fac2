//! The encoded-byte polar grid the profiling core operates on, and its
//! decode parameters.

use ndarray::Array2;

use crate::error::{Result, VpProfileError};

/// Metadata describing how a [`PolarImage`]'s byte values decode to
/// physical units, and the scan geometry it was sampled on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanMetadata {
    /// Number of rays (azimuth dimension, cyclic).
    pub n_az: usize,
    /// Number of range bins (range dimension, not cyclic).
    pub n_ra: usize,
    /// Width of one range bin, in meters.
    pub range_scale: f32,
    /// Angular width of one ray, in degrees.
    pub azimuth_scale_deg: f32,
    /// Elevation angle of the scan, in degrees.
    pub elevation_deg: f32,
    /// Height of the radar antenna above sea level, in meters.
    pub radar_height: f32,
    /// Additive decode offset: `physical = raw as f32 * scale + offset`.
    pub offset: f32,
    /// Multiplicative decode scale.
    pub scale: f32,
    /// Raw byte value denoting missing data.
    pub missing: u8,
}

impl ScanMetadata {
    /// Decodes a raw byte to its physical value, or `None` if it is the
    /// missing-data sentinel.
    pub fn decode(&self, raw: u8) -> Option<f32> {
        if raw == self.missing {
            None
        } else {
            Some(raw as f32 * self.scale + self.offset)
        }
    }

    /// Encodes a physical value to a raw byte.
    ///
    /// Returns [`VpProfileError::RangeEncoding`] if the value, once
    /// quantized, does not fit in `[0, 255]`.
    pub fn encode(&self, value: f32, gate: usize) -> Result<u8> {
        let raw = ((value - self.offset) / self.scale).round();
        if !(0.0..=255.0).contains(&raw) {
            return Err(VpProfileError::RangeEncoding { value, gate });
        }
        Ok(raw as u8)
    }

    /// Height above the radar, in meters, of a gate at the given range bin
    /// on this scan's elevation.
    pub fn beam_height(&self, i_ra: usize) -> f32 {
        const DEG2RAD: f32 = 0.017_453_293;
        let range = (i_ra as f32 + 0.5) * self.range_scale;
        range * (self.elevation_deg * DEG2RAD).sin() + self.radar_height
    }
}

/// A rectangular polar-coordinate grid of raw encoded bytes: azimuth ray x
/// range bin, azimuth cyclic.
#[derive(Debug, Clone)]
pub struct PolarImage {
    /// Decode parameters and geometry.
    pub meta: ScanMetadata,
    /// `[n_az, n_ra]` raw byte grid.
    pub data: Array2<u8>,
}

impl PolarImage {
    /// Builds a new image, filled with the metadata's missing-value
    /// sentinel.
    pub fn new(meta: ScanMetadata) -> Self {
        let data = Array2::from_elem((meta.n_az, meta.n_ra), meta.missing);
        Self { meta, data }
    }

    /// Number of rays.
    pub fn n_az(&self) -> usize {
        self.meta.n_az
    }

    /// Number of range bins.
    pub fn n_ra(&self) -> usize {
        self.meta.n_ra
    }

    /// Decoded value at (ray, bin), or `None` if missing.
    pub fn get(&self, i_az: usize, i_ra: usize) -> Option<f32> {
        self.meta.decode(self.data[[i_az, i_ra]])
    }

    /// Raw byte at (ray, bin).
    pub fn raw(&self, i_az: usize, i_ra: usize) -> u8 {
        self.data[[i_az, i_ra]]
    }

    /// Flat (ray-major) index for (ray, bin), matching the layout used by
    /// [`super::geometry::nearby_index`].
    pub fn flat_index(&self, i_az: usize, i_ra: usize) -> usize {
        i_az * self.meta.n_ra + i_ra
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta() -> ScanMetadata {
        ScanMetadata {
            n_az: 4,
            n_ra: 4,
            range_scale: 250.0,
            azimuth_scale_deg: 1.0,
            elevation_deg: 0.5,
            radar_height: 10.0,
            offset: -32.0,
            scale: 0.5,
            missing: 255,
        }
    }

    #[test]
    fn round_trips_encode_decode() {
        let m = meta();
        let raw = m.encode(0.0, 0).unwrap();
        assert_eq!(m.decode(raw), Some(raw as f32 * 0.5 - 32.0));
    }

    #[test]
    fn encode_out_of_range_errors() {
        let m = meta();
        let err = m.encode(1000.0, 5).unwrap_err();
        assert!(matches!(err, VpProfileError::RangeEncoding { .. }));
    }

    #[test]
    fn new_image_is_all_missing() {
        let img = PolarImage::new(meta());
        assert_eq!(img.get(0, 0), None);
        assert_eq!(img.raw(0, 0), 255);
    }
}
