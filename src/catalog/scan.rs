//! Discovery of TrueView scene directories.
//!
//! A TrueView export is a directory per scan position holding the six cube
//! faces as `face0.jpg` .. `face5.jpg` and usually a `CubeMapMeta.xml`.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{JobError, SceneStitchJob};
use crate::geometry::CubeFaceId;

const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];
const META_FILE: &str = "cubemapmeta.xml";

/// A scene directory found by [`discover_scenes`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredScene {
    /// Job with absolute face paths.
    pub job: SceneStitchJob,
    /// The scene directory.
    pub dir: PathBuf,
    /// File name of the cube map metadata, if present.
    pub meta_file: Option<String>,
}

impl DiscoveredScene {
    /// File name of each face image, keyed by face.
    pub fn face_file_names(&self) -> Vec<(CubeFaceId, String)> {
        self.job
            .face_paths()
            .into_iter()
            .filter_map(|(id, path)| {
                let name = path.file_name()?.to_str()?.to_string();
                Some((id, name))
            })
            .collect()
    }
}

fn face_for_file(path: &Path) -> Option<CubeFaceId> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    if !IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        return None;
    }
    CubeFaceId::from_key(path.file_stem()?.to_str()?)
}

/// Scans the immediate sub-directories of `root` for cube face images.
///
/// Every directory with at least one face image becomes a scene named after
/// the directory. Results are sorted by scene name. When a face has several
/// candidate files (`face0.jpg`, `face0.png`) the first by file name wins.
pub fn discover_scenes(root: &Path) -> Result<Vec<DiscoveredScene>, JobError> {
    let mut dirs: Vec<PathBuf> = fs::read_dir(root)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    dirs.sort();

    let mut scenes = Vec::new();
    for dir in dirs {
        let Some(name) = dir.file_name().and_then(|n| n.to_str()).map(str::to_string) else {
            debug!(dir = %dir.display(), "skipping directory with non UTF-8 name");
            continue;
        };

        let mut files: Vec<PathBuf> = fs::read_dir(&dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect();
        files.sort();

        let mut job = SceneStitchJob::new(name);
        let mut meta_file = None;
        for file in &files {
            if let Some(id) = face_for_file(file) {
                job.faces.entry(id.key().to_string()).or_insert_with(|| file.clone());
                continue;
            }
            let file_name = file.file_name().and_then(|n| n.to_str());
            if let Some(file_name) = file_name.filter(|n| n.eq_ignore_ascii_case(META_FILE)) {
                meta_file = Some(file_name.to_string());
            }
        }

        if job.faces.is_empty() {
            debug!(dir = %dir.display(), "no cube faces found; not a scene");
            continue;
        }
        if job.validate().is_err() {
            debug!(dir = %dir.display(), "directory name is not a usable scene name");
            continue;
        }

        debug!(scene = %job.scene, faces = job.faces.len(), "discovered scene");
        scenes.push(DiscoveredScene { job, dir, meta_file });
    }

    Ok(scenes)
}
