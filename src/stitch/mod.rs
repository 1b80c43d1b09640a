//! Equirectangular stitching.
//!
//! Turns a [`CubeFaceSet`](crate::cubemap::CubeFaceSet) into a 2:1 panorama.

mod config;
mod equirect;

use thiserror::Error;

pub use config::{OutputFormat, StitchOptions, MAX_WIDTH};
pub use equirect::{stitch_equirect, Equirect, StitchStats};

/// Errors that can occur before stitching starts.
#[derive(Error, Debug)]
pub enum StitchError {
    #[error("Invalid output width {0}: must be even and between 2 and 32768")]
    InvalidWidth(u32),
    #[error("Invalid quality {0}: must be in (0, 1]")]
    InvalidQuality(f32),
}
