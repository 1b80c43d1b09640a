//! Cubemap to equirectangular panorama stitcher.
//!
//! Resamples the six cube faces exported by a laser scanner into a single
//! 2:1 equirectangular panorama by inverse mapping every output pixel onto
//! the cube, and publishes the result for a scene catalog.

pub mod geometry;
pub mod cubemap;
pub mod stitch;
pub mod export;
pub mod catalog;

pub use geometry::{reproject, CubeFaceId, FaceCoord};
pub use cubemap::{load_faces, CubeFaceSet, LoadReport};
pub use stitch::{stitch_equirect, Equirect, OutputFormat, StitchError, StitchOptions, StitchStats};
pub use export::{encode_equirect, write_equirect, ExportError};
pub use catalog::{stitch_if_absent, JobError, SceneEntry, SceneStitchJob, StitchOutcome};
