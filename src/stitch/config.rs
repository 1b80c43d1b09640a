//! Configuration for equirectangular stitching and encoding.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::StitchError;

/// Largest accepted output width. 32768 x 16384 RGB is already 1.5 GiB.
pub const MAX_WIDTH: u32 = 32768;

/// Encoded format of the stitched panorama.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Baseline JPEG, lossy, uses [`StitchOptions::quality`].
    #[default]
    Jpeg,
    /// 8-bit RGB PNG, lossless.
    Png,
}

impl OutputFormat {
    /// File extension without the dot.
    pub const fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
        }
    }

    /// Guesses the format from a file extension (`jpg`, `jpeg`, `png`).
    pub fn from_path(path: &Path) -> Option<OutputFormat> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Some(OutputFormat::Jpeg),
            "png" => Some(OutputFormat::Png),
            _ => None,
        }
    }
}

/// Parameters for a stitch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StitchOptions {
    /// Output width in pixels. Must be even; height is `width / 2`.
    pub width: u32,
    /// Encoder quality in (0, 1]. Only used for JPEG.
    pub quality: f32,
    /// Output encoding.
    pub format: OutputFormat,
    /// Color of pixels no face covers.
    pub background: [u8; 3],
}

impl Default for StitchOptions {
    fn default() -> Self {
        Self {
            width: 4096,
            quality: 0.95,
            format: OutputFormat::Jpeg,
            background: [0, 0, 0],
        }
    }
}

impl StitchOptions {
    /// Creates default options with the given width.
    pub fn with_width(width: u32) -> Self {
        Self {
            width,
            ..Default::default()
        }
    }

    /// Small, fast output for thumbnails and quick checks.
    pub fn preview() -> Self {
        Self {
            width: 1024,
            quality: 0.85,
            ..Default::default()
        }
    }

    /// Output height (`width / 2`).
    pub fn height(&self) -> u32 {
        self.width / 2
    }

    /// JPEG quality on the encoder's 1..=100 scale.
    pub fn jpeg_quality(&self) -> u8 {
        (self.quality * 100.0).round().clamp(1.0, 100.0) as u8
    }

    /// Checks width and quality.
    pub fn validate(&self) -> Result<(), StitchError> {
        if self.width < 2 || self.width % 2 != 0 || self.width > MAX_WIDTH {
            return Err(StitchError::InvalidWidth(self.width));
        }
        if !(self.quality > 0.0 && self.quality <= 1.0) {
            return Err(StitchError::InvalidQuality(self.quality));
        }
        Ok(())
    }
}
