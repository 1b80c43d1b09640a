//! Equirectangular pixel to cube face projection.
//!
//! Output pixels are mapped to spherical angles, then to a unit direction,
//! and the direction is projected onto the owning cube face. Everything here is
//! pure math; pixel access lives in [`crate::cubemap`].

use std::f64::consts::PI;

use glam::DVec3;

use super::face::CubeFaceId;

/// A 2D coordinate within a cube face, with UV in [0, 1] range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceCoord {
    /// The cube face this coordinate belongs to.
    pub face: CubeFaceId,
    /// U coordinate in [0, 1] range (left to right).
    pub u: f64,
    /// V coordinate in [0, 1] range (top row to bottom row).
    pub v: f64,
}

impl FaceCoord {
    /// Creates a new face coordinate.
    pub fn new(face: CubeFaceId, u: f64, v: f64) -> Self {
        Self { face, u, v }
    }

    /// Nearest source pixel for a face of `width` x `height`.
    ///
    /// `u == 1.0` (or `v == 1.0`) lands on the last column (row) instead of
    /// one past the edge.
    pub fn to_pixel(self, width: u32, height: u32) -> (u32, u32) {
        debug_assert!(width > 0 && height > 0);
        let px = ((self.u * width as f64).floor() as u32).min(width - 1);
        let py = ((self.v * height as f64).floor() as u32).min(height - 1);
        (px, py)
    }
}

/// Maps an output pixel to `(latitude, longitude)` in radians.
///
/// Latitude spans `[-pi/2, pi/2)` from the first row down, longitude spans
/// `[-pi, pi)` from the first column right. Pixel corners are sampled, not
/// centers.
#[inline]
pub fn pixel_to_lat_lon(x: u32, y: u32, width: u32, height: u32) -> (f64, f64) {
    let lat = PI * (y as f64 / height as f64 - 0.5);
    let lon = 2.0 * PI * (x as f64 / width as f64 - 0.5);
    (lat, lon)
}

/// Converts spherical angles to a unit direction.
///
/// `lon = 0` on the equator points along +X; `lon = pi/2` points along +Z.
#[inline]
pub fn lat_lon_to_dir(lat: f64, lon: f64) -> DVec3 {
    let (slat, clat) = lat.sin_cos();
    let (slon, clon) = lon.sin_cos();
    DVec3::new(clat * clon, slat, clat * slon)
}

/// Direction seen through output pixel `(x, y)` of a `width` x `height` panorama.
#[inline]
pub fn pixel_direction(x: u32, y: u32, width: u32, height: u32) -> DVec3 {
    let (lat, lon) = pixel_to_lat_lon(x, y, width, height);
    lat_lon_to_dir(lat, lon)
}

/// Picks the face owning `dir`: the axis of largest magnitude.
///
/// The X axis holds the pixel first, then Y and Z may take it over only with a
/// strictly larger magnitude, in that order. Ties between X and another axis
/// stay on X; ties between Y and Z go to Y.
#[inline]
pub fn select_face(dir: DVec3) -> CubeFaceId {
    let mut face = if dir.x > 0.0 {
        CubeFaceId::Right
    } else {
        CubeFaceId::Back
    };
    let mut max = dir.x.abs();

    if dir.y.abs() > max {
        face = if dir.y > 0.0 {
            CubeFaceId::Top
        } else {
            CubeFaceId::Bottom
        };
        max = dir.y.abs();
    }

    if dir.z.abs() > max {
        face = if dir.z > 0.0 {
            CubeFaceId::Front
        } else {
            CubeFaceId::Left
        };
    }

    face
}

/// Face-local UV of `dir` on `face`.
///
/// The two off-axis components are divided by the signed on-axis component
/// and remapped from [-1, 1] to [0, 1]. The result is only meaningful when
/// `face` is the one [`select_face`] picks; other faces may produce values
/// outside [0, 1] or non-finite values.
#[inline]
pub fn face_uv(face: CubeFaceId, dir: DVec3) -> (f64, f64) {
    let DVec3 { x, y, z } = dir;
    let (s, t) = match face {
        CubeFaceId::Back => (z / -x, y / -x),
        CubeFaceId::Right => (-z / x, y / x),
        CubeFaceId::Front => (x / z, y / z),
        CubeFaceId::Left => (-x / -z, y / -z),
        CubeFaceId::Top => (x / y, -z / y),
        CubeFaceId::Bottom => (x / -y, z / -y),
    };
    ((s + 1.0) * 0.5, (t + 1.0) * 0.5)
}

#[inline]
fn in_unit_range(value: f64) -> bool {
    (0.0..=1.0).contains(&value)
}

/// Projects a direction onto its owning cube face.
///
/// Returns `None` when the UV falls outside [0, 1] (or is NaN), in which case
/// the output pixel keeps its background color.
#[inline]
pub fn reproject(dir: DVec3) -> Option<FaceCoord> {
    let face = select_face(dir);
    let (u, v) = face_uv(face, dir);
    if in_unit_range(u) && in_unit_range(v) {
        Some(FaceCoord::new(face, u, v))
    } else {
        None
    }
}
