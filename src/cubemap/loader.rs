//! Loading cube face images from disk.
//!
//! Loading never fails as a whole: a face whose file is missing or cannot be
//! decoded is left out of the [`CubeFaceSet`] and reported in [`LoadReport`].

use std::path::{Path, PathBuf};

use image::RgbImage;
use rayon::prelude::*;
use tracing::{debug, warn};

use super::CubeFaceSet;
use crate::geometry::CubeFaceId;

/// Why a face ended up absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FaceProblem {
    /// No path was supplied for the face.
    NotProvided,
    /// A path was supplied but no file exists there.
    NotFound(PathBuf),
    /// The file exists but could not be read or decoded.
    Decode(PathBuf, String),
}

/// Per-face outcome of [`load_faces`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Faces that decoded successfully.
    pub loaded: Vec<CubeFaceId>,
    /// Faces left absent, with the reason.
    pub problems: Vec<(CubeFaceId, FaceProblem)>,
}

impl LoadReport {
    /// Returns true if all six faces loaded.
    pub fn is_complete(&self) -> bool {
        self.loaded.len() == 6
    }

    /// Faces whose file existed but failed to decode.
    pub fn failed(&self) -> Vec<CubeFaceId> {
        self.problems
            .iter()
            .filter(|(_, p)| matches!(p, FaceProblem::Decode(..)))
            .map(|(id, _)| *id)
            .collect()
    }

    /// Faces that had no usable file (not provided or not found).
    pub fn missing(&self) -> Vec<CubeFaceId> {
        self.problems
            .iter()
            .filter(|(_, p)| !matches!(p, FaceProblem::Decode(..)))
            .map(|(id, _)| *id)
            .collect()
    }
}

/// Decodes a single image file into RGB8, dropping any alpha channel.
pub fn load_face_image(path: &Path) -> Result<RgbImage, image::ImageError> {
    Ok(image::open(path)?.into_rgb8())
}

/// Loads the faces listed in `paths` into a [`CubeFaceSet`].
///
/// If a face is listed more than once, the last path wins. Faces are decoded
/// in parallel.
pub fn load_faces<I, P>(paths: I) -> (CubeFaceSet, LoadReport)
where
    I: IntoIterator<Item = (CubeFaceId, P)>,
    P: AsRef<Path>,
{
    let mut slots: [Option<PathBuf>; 6] = Default::default();
    for (id, path) in paths {
        slots[id.index()] = Some(path.as_ref().to_path_buf());
    }

    let results: Vec<(CubeFaceId, Result<RgbImage, FaceProblem>)> = CubeFaceId::all()
        .into_par_iter()
        .map(|id| (id, load_slot(id, slots[id.index()].as_deref())))
        .collect();

    let mut set = CubeFaceSet::new();
    let mut report = LoadReport::default();
    for (id, result) in results {
        match result {
            Ok(image) => {
                debug!(face = %id, width = image.width(), height = image.height(), "loaded cube face");
                set.insert(id, image);
                report.loaded.push(id);
            }
            Err(problem) => report.problems.push((id, problem)),
        }
    }

    (set, report)
}

fn load_slot(id: CubeFaceId, path: Option<&Path>) -> Result<RgbImage, FaceProblem> {
    let Some(path) = path else {
        warn!(face = %id, "no image provided for cube face; it will stay background");
        return Err(FaceProblem::NotProvided);
    };

    if !path.exists() {
        warn!(face = %id, path = %path.display(), "cube face image not found; skipping");
        return Err(FaceProblem::NotFound(path.to_path_buf()));
    }

    load_face_image(path).map_err(|e| {
        warn!(face = %id, path = %path.display(), error = %e, "failed to decode cube face; skipping");
        FaceProblem::Decode(path.to_path_buf(), e.to_string())
    })
}
