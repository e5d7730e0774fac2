//! Local-neighborhood texture of the radial-velocity field: a proxy for
//! turbulence and ground clutter used by the weather-cell finder.

use crate::error::Result;

use super::geometry::nearby_index;
use super::image::{PolarImage, ScanMetadata};

/// Computes the texture image: for every gate, the standard deviation of
/// the decoded vrad difference to its `n_az_nbh x n_ra_nbh` neighborhood,
/// requiring at least `n_count_min` valid neighbors.
///
/// `tex_meta` supplies the geometry and byte-encoding of the output image;
/// its `n_az`/`n_ra` must match `vrad`/`dbz`.
pub fn calc_texture(
    vrad: &PolarImage,
    dbz: &PolarImage,
    tex_meta: ScanMetadata,
    n_az_nbh: usize,
    n_ra_nbh: usize,
    n_count_min: usize,
) -> Result<PolarImage> {
    let n_az = vrad.n_az();
    let n_ra = vrad.n_ra();
    let n_neighborhood = n_az_nbh * n_ra_nbh;

    let mut tex = PolarImage::new(tex_meta);

    for i_az in 0..n_az {
        for i_ra in 0..n_ra {
            let i_global = vrad.flat_index(i_az, i_ra);

            let center_vrad = match vrad.get(i_az, i_ra) {
                Some(v) => v,
                None => continue, // leaves tex at its missing sentinel
            };

            let mut count = 0usize;
            let mut m1 = 0.0f64;
            let mut m2 = 0.0f64;
            let mut dbz_sum = 0.0f64;

            for i_nbh in 0..n_neighborhood {
                let i_local = match nearby_index(n_az, n_ra, i_global, n_az_nbh, n_ra_nbh, i_nbh) {
                    Ok(idx) => idx,
                    Err(_) => continue,
                };
                let local_az = i_local / n_ra;
                let local_ra = i_local % n_ra;

                let neighbor_vrad = match vrad.get(local_az, local_ra) {
                    Some(v) => v,
                    None => continue,
                };
                let neighbor_dbz = match dbz.get(local_az, local_ra) {
                    Some(v) => v,
                    None => continue,
                };

                let diff = (center_vrad - neighbor_vrad) as f64;
                m1 += diff;
                m2 += diff * diff;
                dbz_sum += neighbor_dbz as f64;
                count += 1;
            }

            if count < n_count_min {
                continue; // leaves tex at its missing sentinel
            }

            m1 /= count as f64;
            m2 /= count as f64;
            let _dbz_avg = dbz_sum / count as f64; // kept for parity with the original; unused downstream

            let texture = (m2 - m1 * m1).abs().sqrt() as f32;
            let encoded = tex_meta.encode(texture, i_global)?;
            tex.data[[i_az, i_ra]] = encoded;
        }
    }

    Ok(tex)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_meta(missing: u8) -> ScanMetadata {
        ScanMetadata {
            n_az: 8,
            n_ra: 8,
            range_scale: 250.0,
            azimuth_scale_deg: 45.0,
            elevation_deg: 0.5,
            radar_height: 0.0,
            offset: -32.0,
            scale: 0.5,
            missing,
        }
    }

    #[test]
    fn uniform_field_has_zero_texture() {
        let meta = flat_meta(255);
        let mut vrad = PolarImage::new(meta);
        let mut dbz = PolarImage::new(meta);
        for i_az in 0..8 {
            for i_ra in 0..8 {
                vrad.data[[i_az, i_ra]] = meta.encode(5.0, 0).unwrap();
                dbz.data[[i_az, i_ra]] = meta.encode(10.0, 0).unwrap();
            }
        }
        let tex_meta = ScanMetadata {
            offset: 0.0,
            scale: 0.05,
            ..meta
        };
        let tex = calc_texture(&vrad, &dbz, tex_meta, 3, 3, 4).unwrap();
        assert_eq!(tex.get(4, 4), Some(0.0));
    }

    #[test]
    fn sparse_field_is_missing() {
        let meta = flat_meta(255);
        let vrad = PolarImage::new(meta); // all missing
        let dbz = PolarImage::new(meta);
        let tex_meta = ScanMetadata {
            offset: 0.0,
            scale: 0.05,
            ..meta
        };
        let tex = calc_texture(&vrad, &dbz, tex_meta, 3, 3, 4).unwrap();
        assert_eq!(tex.get(4, 4), None);
    }
}
