//! Cubemap to equirectangular reprojection.
//!
//! Every output pixel is pulled from the cube: pixel -> (lat, lon) ->
//! direction -> owning face and UV -> nearest source pixel. Rows are
//! independent and rendered in parallel.

use glam::DVec3;
use image::{Rgb, RgbImage};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use super::{StitchError, StitchOptions};
use crate::cubemap::CubeFaceSet;
use crate::geometry::{pixel_to_lat_lon, reproject, CubeFaceId};

/// Coverage counters for a stitched panorama.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StitchStats {
    /// Pixels copied from a cube face.
    pub sampled: u64,
    /// Pixels left at the background color.
    pub background: u64,
    /// Faces that were available.
    pub faces_present: Vec<CubeFaceId>,
}

impl StitchStats {
    /// True when no pixel was sampled. Callers should fall back to another
    /// panorama source.
    pub fn is_blank(&self) -> bool {
        self.sampled == 0
    }

    /// Fraction of pixels copied from a face, in [0, 1].
    pub fn coverage(&self) -> f64 {
        let total = self.sampled + self.background;
        if total == 0 {
            0.0
        } else {
            self.sampled as f64 / total as f64
        }
    }
}

/// A stitched equirectangular panorama.
#[derive(Debug, Clone)]
pub struct Equirect {
    /// RGB pixels, `width x width / 2`.
    pub image: RgbImage,
    /// Coverage counters.
    pub stats: StitchStats,
}

impl Equirect {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Stitches `faces` into an equirectangular panorama.
///
/// Absent faces leave their directions at `options.background`; an empty set
/// produces a fully background image. Only invalid options are errors.
pub fn stitch_equirect(faces: &CubeFaceSet, options: &StitchOptions) -> Result<Equirect, StitchError> {
    options.validate()?;

    let width = options.width;
    let height = options.height();
    let present = faces.present();

    if present.is_empty() {
        warn!("no cube faces available; panorama will be all background");
    } else if present.len() < 6 {
        warn!(missing = ?faces.absent(), "stitching with missing cube faces");
    }
    debug!(width, height, faces = present.len(), "stitching equirectangular panorama");

    // Longitude only depends on the column.
    let columns: Vec<(f64, f64)> = (0..width)
        .map(|x| pixel_to_lat_lon(x, 0, width, height).1.sin_cos())
        .collect();

    let background = Rgb(options.background);
    let mut image = RgbImage::from_pixel(width, height, background);
    let row_len = width as usize * 3;

    let sampled: u64 = image
        .par_chunks_mut(row_len)
        .enumerate()
        .map(|(y, row)| render_row(faces, &columns, y as u32, width, height, row))
        .sum();

    let total = width as u64 * height as u64;
    let stats = StitchStats {
        sampled,
        background: total - sampled,
        faces_present: present,
    };
    info!(
        width,
        height,
        coverage = stats.coverage(),
        "stitched equirectangular panorama"
    );

    Ok(Equirect { image, stats })
}

/// Renders one output row, returning how many pixels were sampled.
fn render_row(
    faces: &CubeFaceSet,
    columns: &[(f64, f64)],
    y: u32,
    width: u32,
    height: u32,
    row: &mut [u8],
) -> u64 {
    let (lat, _) = pixel_to_lat_lon(0, y, width, height);
    let (slat, clat) = lat.sin_cos();

    let mut sampled = 0;
    for (px, &(slon, clon)) in row.chunks_exact_mut(3).zip(columns) {
        let dir = DVec3::new(clat * clon, slat, clat * slon);
        let Some(color) = reproject(dir).and_then(|coord| faces.sample(coord)) else {
            continue;
        };
        px.copy_from_slice(&color.0);
        sampled += 1;
    }
    sampled
}
