//! Cube face images: storage, sampling and loading.

mod face_set;
mod loader;

pub use face_set::CubeFaceSet;
pub use loader::{load_face_image, load_faces, FaceProblem, LoadReport};
