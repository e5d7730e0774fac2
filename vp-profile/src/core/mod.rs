//! The vertical-profile processing core: the eight components of §4,
//! wired together by [`engine::run`].

pub mod cellanalyzer;
pub mod cellfinder;
pub mod classifier;
pub mod engine;
pub mod geometry;
pub mod image;
pub mod points;
pub mod profile;
pub mod svd;
pub mod texture;
pub mod volume;

pub use engine::run;
pub use image::{PolarImage, ScanMetadata};
pub use profile::{ProfileOutput, ProfileRow, ProfileTable};
pub use volume::{PolarScan, PolarVolume};
