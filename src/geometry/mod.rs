//! Cubemap geometry module.
//!
//! Provides the fixed six-face layout and the projection from equirectangular
//! pixels to face-local UV coordinates.

mod face;
mod projection;

pub use face::CubeFaceId;
pub use projection::{
    face_uv, lat_lon_to_dir, pixel_direction, pixel_to_lat_lon, reproject, select_face,
    FaceCoord,
};
