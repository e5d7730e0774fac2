//! Error types for the vp-profile crate.

use thiserror::Error;

/// Result type alias for vp-profile operations.
pub type Result<T> = std::result::Result<T, VpProfileError>;

/// The crate-wide error type, covering both the CfRadial1 ingestion
/// backend and the vertical-profile processing core.
#[derive(Error, Debug)]
pub enum VpProfileError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HDF5 error
    #[error("HDF5 error: {0}")]
    Hdf5(#[from] hdf5::Error),

    /// NetCDF error
    #[error("NetCDF error: {0}")]
    NetCdf(#[from] netcdf::Error),

    /// File format error
    #[error("Invalid file format: {0}")]
    InvalidFormat(String),

    /// Missing required attribute
    #[error("Missing required attribute: {0}")]
    MissingAttribute(String),

    /// Missing required variable
    #[error("Missing required variable: {0}")]
    MissingVariable(String),

    /// Invalid sweep index
    #[error("Invalid sweep index: {0}")]
    InvalidSweepIndex(usize),

    /// Data conversion error
    #[error("Data conversion error: {0}")]
    Conversion(String),

    /// Unsupported feature
    #[error("Unsupported feature: {0}")]
    Unsupported(String),

    /// A `Config` value failed validation.
    #[error("invalid configuration: {0}")]
    ConfigInvalid(String),

    /// A scan was missing a parameter the pipeline requires (e.g. no
    /// `"DBZH"` or `"VRAD"` image).
    #[error("missing required parameter: {0}")]
    MissingParameter(String),

    /// A decoded value could not be re-encoded into its byte representation.
    #[error("value {value} at gate {gate} does not fit its byte encoding")]
    RangeEncoding {
        /// The value that failed to encode.
        value: f32,
        /// The flat gate index it was computed for.
        gate: usize,
    },

    /// SVD iteration did not converge within the allotted sweep count.
    #[error("singular value decomposition did not converge")]
    SvdNonConvergent,

    /// The cell finder was given a threshold that coincides with the
    /// image's missing-data sentinel.
    #[error("cell finder threshold is degenerate for this image's encoding")]
    CellFinderDegenerate,

    /// A points-table write would have exceeded its layer's index window.
    #[error("points table index overflow at row {0}")]
    IndexOverflow(usize),

    /// A volume was given to the engine with no scans.
    #[error("volume has no scans")]
    EmptyVolume,

    /// General error
    #[error("Error: {0}")]
    General(String),
}

impl From<String> for VpProfileError {
    fn from(s: String) -> Self {
        VpProfileError::General(s)
    }
}

impl From<&str> for VpProfileError {
    fn from(s: &str) -> Self {
        VpProfileError::General(s.to_string())
    }
}
