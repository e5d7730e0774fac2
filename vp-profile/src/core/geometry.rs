//! Geometry helpers shared by texture, cell finding, and fringe growth: a
//! planar distance between two gates, and mapping a cell of a local
//! neighborhood window onto a parent polar image with azimuth wraparound.

use thiserror::Error;

/// Failure modes of [`nearby_index`], one per precondition the original
/// negative-return-code scheme distinguished.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryError {
    /// `n_ra_child` was not odd.
    #[error("child window range dimension must be odd")]
    ChildRangeNotOdd,
    /// `n_az_child` was not odd.
    #[error("child window azimuth dimension must be odd")]
    ChildAzimuthNotOdd,
    /// `i_child` is outside the child window.
    #[error("child index is outside the child window")]
    ChildIndexOutOfWindow,
    /// The mapped parent range index fell past the far edge of the parent image.
    #[error("mapped index is outside the parent image on the far range edge")]
    ParentRangeTooHigh,
    /// The mapped parent range index fell before the near edge of the parent image.
    #[error("mapped index is outside the parent image on the near range edge")]
    ParentRangeTooLow,
}

/// Maps a flat index into a `n_az_child x n_ra_child` window, centered on
/// `i_parent` in a `n_az_parent x n_ra_parent` parent image, back to a flat
/// index in the parent image.
///
/// The azimuth dimension wraps (ray 0 is adjacent to the last ray); the
/// range dimension does not, and an out-of-bounds range maps to an error
/// instead of wrapping or clamping.
pub fn nearby_index(
    n_az_parent: usize,
    n_ra_parent: usize,
    i_parent: usize,
    n_az_child: usize,
    n_ra_child: usize,
    i_child: usize,
) -> Result<usize, GeometryError> {
    if n_ra_child % 2 != 1 {
        return Err(GeometryError::ChildRangeNotOdd);
    }
    if n_az_child % 2 != 1 {
        return Err(GeometryError::ChildAzimuthNotOdd);
    }
    if i_child > n_az_child * n_ra_child - 1 {
        return Err(GeometryError::ChildIndexOutOfWindow);
    }

    let az_parent = i_parent / n_ra_parent;
    let ra_parent = i_parent % n_ra_parent;

    let az_child = i_child / n_ra_child;
    let ra_child = i_child % n_ra_child;

    let az_return = (az_parent + n_az_parent + az_child)
        .wrapping_sub(n_az_child / 2)
        % n_az_parent;
    let ra_signed = ra_parent as isize - (n_ra_child / 2) as isize + ra_child as isize;

    if ra_signed > (n_ra_parent - 1) as isize {
        return Err(GeometryError::ParentRangeTooHigh);
    }
    if ra_signed < 0 {
        return Err(GeometryError::ParentRangeTooLow);
    }

    Ok(az_return * n_ra_parent + ra_signed as usize)
}

const DEG2RAD: f32 = 0.017_453_293;

/// Planar (law-of-cosines) distance in meters between two gates given as
/// (range-bin, ray) index pairs.
pub fn great_circle_distance(
    i_ra1: usize,
    i_az1: usize,
    i_ra2: usize,
    i_az2: usize,
    range_scale: f32,
    azimuth_scale_deg: f32,
) -> f32 {
    let range1 = i_ra1 as f32 * range_scale;
    let range2 = i_ra2 as f32 * range_scale;
    let azimuth1 = i_az1 as f32 * azimuth_scale_deg * DEG2RAD;
    let azimuth2 = i_az2 as f32 * azimuth_scale_deg * DEG2RAD;

    (range1 * range1 + range2 * range2 - 2.0 * range1 * range2 * (azimuth1 - azimuth2).cos())
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_azimuth_at_seam() {
        // Parent: 8 azimuths x 5 ranges. Child: 3x3 centered at azimuth 0.
        let i_parent = 0 * 5 + 2; // azimuth 0, range 2
        let idx = nearby_index(8, 5, i_parent, 3, 3, 0).unwrap(); // child (0,0) = up-left
        let az = idx / 5;
        assert_eq!(az, 7); // wrapped to last azimuth
    }

    #[test]
    fn rejects_even_child_dims() {
        assert_eq!(
            nearby_index(8, 5, 0, 2, 3, 0),
            Err(GeometryError::ChildAzimuthNotOdd)
        );
        assert_eq!(
            nearby_index(8, 5, 0, 3, 2, 0),
            Err(GeometryError::ChildRangeNotOdd)
        );
    }

    #[test]
    fn rejects_range_out_of_bounds() {
        // Range 0, child window reaching one step below: ra_signed = -1.
        let err = nearby_index(8, 5, 0, 3, 3, 0).unwrap_err();
        assert_eq!(err, GeometryError::ParentRangeTooLow);
    }

    #[test]
    fn distance_zero_for_identical_gate() {
        assert_eq!(great_circle_distance(3, 10, 3, 10, 250.0, 1.0), 0.0);
    }
}
