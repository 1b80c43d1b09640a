//! Scene stitch jobs and the "stitch if absent" workflow.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::JobError;
use crate::cubemap::{load_faces, LoadReport};
use crate::export::write_equirect;
use crate::geometry::CubeFaceId;
use crate::stitch::{stitch_equirect, OutputFormat, StitchOptions, StitchStats};

/// One scene to stitch: its name and the image path of each face.
///
/// Face keys are `face0`..`face5`; missing keys are allowed.
///
/// ```json
/// { "scene": "E57_SCAN_0125-3", "faces": { "face0": "scan/face0.jpg", "face2": "scan/face2.jpg" } }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneStitchJob {
    /// Scene name; also the stem of the output file.
    pub scene: String,
    /// Face key to image path.
    #[serde(default)]
    pub faces: BTreeMap<String, PathBuf>,
}

impl SceneStitchJob {
    /// Creates a job with no faces.
    pub fn new(scene: impl Into<String>) -> Self {
        Self {
            scene: scene.into(),
            faces: BTreeMap::new(),
        }
    }

    /// Builder-style face assignment.
    pub fn with_face(mut self, face: CubeFaceId, path: impl Into<PathBuf>) -> Self {
        self.faces.insert(face.key().to_string(), path.into());
        self
    }

    /// Reads a job from a JSON file. Relative face paths are resolved against
    /// the file's directory.
    pub fn from_json_file(path: &Path) -> Result<Self, JobError> {
        let text = fs::read_to_string(path)?;
        let mut job: SceneStitchJob = serde_json::from_str(&text)?;
        if let Some(base) = path.parent() {
            job.resolve_relative(base);
        }
        job.validate()?;
        Ok(job)
    }

    /// Prefixes every relative face path with `base`.
    pub fn resolve_relative(&mut self, base: &Path) {
        for path in self.faces.values_mut() {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }

    /// Rejects scene names that cannot be used as a file stem.
    pub fn validate(&self) -> Result<(), JobError> {
        let name = self.scene.as_str();
        let bad = name.is_empty()
            || name == "."
            || name == ".."
            || name.contains(&['/', '\\'][..])
            || name.chars().any(char::is_control);
        if bad {
            return Err(JobError::InvalidScene(self.scene.clone()));
        }
        Ok(())
    }

    /// Faces with a recognised key. Unknown keys are logged and ignored.
    pub fn face_paths(&self) -> Vec<(CubeFaceId, PathBuf)> {
        self.faces
            .iter()
            .filter_map(|(key, path)| match CubeFaceId::from_key(key) {
                Some(id) => Some((id, path.clone())),
                None => {
                    warn!(scene = %self.scene, key = %key, "ignoring unknown face key");
                    None
                }
            })
            .collect()
    }

    /// `<scene>_stitched.<ext>`
    pub fn output_file_name(&self, format: OutputFormat) -> String {
        format!("{}_stitched.{}", self.scene, format.extension())
    }

    /// `<output_root>/<scene>_stitched.<ext>`
    pub fn output_path(&self, output_root: &Path, format: OutputFormat) -> PathBuf {
        output_root.join(self.output_file_name(format))
    }
}

/// Result of running a job.
#[derive(Debug, Clone)]
pub enum StitchOutcome {
    /// The output already existed; nothing was loaded or computed.
    Skipped { path: PathBuf },
    /// A panorama was stitched and written.
    Stitched {
        path: PathBuf,
        report: LoadReport,
        stats: StitchStats,
    },
}

impl StitchOutcome {
    /// Path of the panorama on disk.
    pub fn path(&self) -> &Path {
        match self {
            StitchOutcome::Skipped { path } | StitchOutcome::Stitched { path, .. } => path,
        }
    }

    pub fn was_stitched(&self) -> bool {
        matches!(self, StitchOutcome::Stitched { .. })
    }
}

/// Loads, stitches and writes `job` unconditionally.
pub fn stitch_job(job: &SceneStitchJob, output_root: &Path, options: &StitchOptions) -> Result<StitchOutcome, JobError> {
    job.validate()?;
    options.validate()?;

    let path = job.output_path(output_root, options.format);
    let (faces, report) = load_faces(job.face_paths());
    let pano = stitch_equirect(&faces, options)?;
    write_equirect(&pano.image, &path, options)?;

    info!(
        scene = %job.scene,
        path = %path.display(),
        faces = report.loaded.len(),
        "panorama stitched"
    );
    Ok(StitchOutcome::Stitched {
        path,
        report,
        stats: pano.stats,
    })
}

/// Stitches `job` unless its output file already exists.
///
/// The existence check happens before any face is loaded.
pub fn stitch_if_absent(job: &SceneStitchJob, output_root: &Path, options: &StitchOptions) -> Result<StitchOutcome, JobError> {
    job.validate()?;
    let path = job.output_path(output_root, options.format);
    if path.exists() {
        info!(scene = %job.scene, path = %path.display(), "panorama already exists; skipping");
        return Ok(StitchOutcome::Skipped { path });
    }
    stitch_job(job, output_root, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use tempfile::tempdir;

    fn write_face(dir: &Path, id: CubeFaceId, color: [u8; 3]) -> PathBuf {
        let path = dir.join(format!("{}.png", id.key()));
        RgbImage::from_pixel(16, 16, Rgb(color)).save(&path).unwrap();
        path
    }

    fn small() -> StitchOptions {
        StitchOptions::with_width(64)
    }

    #[test]
    fn test_output_naming() {
        let job = SceneStitchJob::new("E57_SCAN_0125-3");
        assert_eq!(job.output_file_name(OutputFormat::Jpeg), "E57_SCAN_0125-3_stitched.jpg");
        assert_eq!(
            job.output_path(Path::new("/srv/output/trueview_stitched"), OutputFormat::Png),
            PathBuf::from("/srv/output/trueview_stitched/E57_SCAN_0125-3_stitched.png")
        );
    }

    #[test]
    fn test_invalid_scene_names() {
        for name in ["", ".", "..", "a/b", "a\\b", "tab\there"] {
            let job = SceneStitchJob::new(name);
            assert!(matches!(job.validate(), Err(JobError::InvalidScene(_))), "{:?}", name);
        }
        assert!(SceneStitchJob::new("scan 01").validate().is_ok());
    }

    #[test]
    fn test_face_paths_skip_unknown_keys() {
        let mut job = SceneStitchJob::new("s")
            .with_face(CubeFaceId::Top, "top.jpg")
            .with_face(CubeFaceId::Back, "back.jpg");
        job.faces.insert("thumbnail".into(), "thumb.jpg".into());

        assert_eq!(
            job.face_paths(),
            vec![
                (CubeFaceId::Back, PathBuf::from("back.jpg")),
                (CubeFaceId::Top, PathBuf::from("top.jpg")),
            ]
        );
    }

    #[test]
    fn test_from_json_file_resolves_relative_paths() {
        let dir = tempdir().unwrap();
        let job_path = dir.path().join("job.json");
        std::fs::write(
            &job_path,
            r#"{"scene": "hall", "faces": {"face2": "hall/face2.jpg", "face4": "/abs/face4.jpg"}}"#,
        )
        .unwrap();

        let job = SceneStitchJob::from_json_file(&job_path).unwrap();
        assert_eq!(job.scene, "hall");
        assert_eq!(job.faces["face2"], dir.path().join("hall/face2.jpg"));
        assert_eq!(job.faces["face4"], PathBuf::from("/abs/face4.jpg"));
    }

    #[test]
    fn test_from_json_file_errors() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            SceneStitchJob::from_json_file(&dir.path().join("missing.json")),
            Err(JobError::Io(_))
        ));

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{ scene: ").unwrap();
        assert!(matches!(SceneStitchJob::from_json_file(&bad), Err(JobError::Json(_))));

        let slash = dir.path().join("slash.json");
        std::fs::write(&slash, r#"{"scene": "../etc"}"#).unwrap();
        assert!(matches!(
            SceneStitchJob::from_json_file(&slash),
            Err(JobError::InvalidScene(_))
        ));
    }

    #[test]
    fn test_stitch_if_absent_runs_once() {
        let input = tempdir().unwrap();
        let output = tempdir().unwrap();
        let job = CubeFaceId::all().into_iter().fold(SceneStitchJob::new("lobby"), |job, id| {
            let path = write_face(input.path(), id, [40 * id.index() as u8, 0, 0]);
            job.with_face(id, path)
        });

        let first = stitch_if_absent(&job, output.path(), &small()).unwrap();
        assert!(first.was_stitched());
        assert_eq!(first.path(), output.path().join("lobby_stitched.jpg"));
        let bytes = std::fs::read(first.path()).unwrap();
        if let StitchOutcome::Stitched { report, stats, .. } = &first {
            assert!(report.is_complete());
            assert_eq!(stats.background, 0);
        }

        // Inputs are gone: a second run must not even try to load them.
        for path in job.faces.values() {
            std::fs::remove_file(path).unwrap();
        }
        let second = stitch_if_absent(&job, output.path(), &small()).unwrap();
        assert!(!second.was_stitched());
        assert_eq!(second.path(), first.path());
        assert_eq!(std::fs::read(second.path()).unwrap(), bytes);
    }

    #[test]
    fn test_missing_faces_degrade_but_succeed() {
        let input = tempdir().unwrap();
        let output = tempdir().unwrap();
        let front = write_face(input.path(), CubeFaceId::Front, [0, 0, 255]);
        let job = SceneStitchJob::new("partial")
            .with_face(CubeFaceId::Front, front)
            .with_face(CubeFaceId::Back, input.path().join("nope.jpg"));

        let outcome = stitch_job(&job, output.path(), &small()).unwrap();
        let StitchOutcome::Stitched { report, stats, path } = outcome else {
            panic!("expected a stitched outcome");
        };
        assert_eq!(report.loaded, vec![CubeFaceId::Front]);
        assert!(stats.sampled > 0 && stats.background > 0);
        assert!(path.exists());
    }

    #[test]
    fn test_unwritable_destination_is_an_error() {
        let input = tempdir().unwrap();
        let output = tempdir().unwrap();
        // A plain file where the output directory should be.
        let blocker = output.path().join("not_a_dir");
        std::fs::write(&blocker, b"x").unwrap();

        let job = SceneStitchJob::new("s").with_face(
            CubeFaceId::Top,
            write_face(input.path(), CubeFaceId::Top, [255, 255, 255]),
        );
        let result = stitch_job(&job, &blocker, &small());
        assert!(matches!(result, Err(JobError::Export(_))), "got {:?}", result);
    }
}
