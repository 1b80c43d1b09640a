//! Scene catalog entries consumed by the viewer.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use super::{discover_scenes, stitch_if_absent, DiscoveredScene, JobError, StitchOutcome};
use crate::geometry::CubeFaceId;
use crate::stitch::StitchOptions;

/// Source tag for scenes built from TrueView cube maps.
pub const TRUEVIEW_SOURCE: &str = "trueview";

/// URL prefixes under which inputs and stitched outputs are served.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogUrls {
    /// Prefix for the TrueView input tree, e.g. `/input_data/trueview`.
    pub input_prefix: String,
    /// Prefix for stitched panoramas, e.g. `/output/trueview_stitched`.
    pub output_prefix: String,
}

impl Default for CatalogUrls {
    fn default() -> Self {
        Self {
            input_prefix: "/input_data/trueview".to_string(),
            output_prefix: "/output/trueview_stitched".to_string(),
        }
    }
}

impl CatalogUrls {
    /// `<input_prefix>/<scene>/<file>`
    pub fn input_url(&self, scene: &str, file: &str) -> String {
        format!("{}/{}/{}", self.input_prefix.trim_end_matches('/'), scene, file)
    }

    /// `<output_prefix>/<file>`
    pub fn output_url(&self, file: &str) -> String {
        format!("{}/{}", self.output_prefix.trim_end_matches('/'), file)
    }
}

/// Files attached to a scene.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneFiles {
    /// Cube map metadata URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<String>,
    /// Face key to image URL.
    pub cube: BTreeMap<String, String>,
    /// Panorama URL shown by the viewer.
    pub panorama: Option<String>,
}

/// One scene as published to the viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneEntry {
    pub name: String,
    pub source: String,
    pub files: SceneFiles,
}

/// Builds the catalog entry for `scene`, stitching its panorama if needed.
///
/// When stitching fails, or yields nothing but background, the `face0` image
/// is published as the panorama instead.
pub fn catalog_scene(
    scene: &DiscoveredScene,
    output_root: &Path,
    urls: &CatalogUrls,
    options: &StitchOptions,
) -> SceneEntry {
    let name = scene.job.scene.clone();
    let cube: BTreeMap<String, String> = scene
        .face_file_names()
        .into_iter()
        .map(|(id, file)| (id.key().to_string(), urls.input_url(&name, &file)))
        .collect();
    let fallback = cube.get(CubeFaceId::Back.key()).cloned();

    let stitched = match stitch_if_absent(&scene.job, output_root, options) {
        Ok(StitchOutcome::Stitched { ref path, ref stats, .. }) if stats.is_blank() => {
            warn!(scene = %name, "stitched panorama is blank; publishing face0 instead");
            if let Err(e) = fs::remove_file(path) {
                warn!(path = %path.display(), error = %e, "could not remove blank panorama");
            }
            None
        }
        Ok(outcome) => Some(outcome),
        Err(e) => {
            error!(scene = %name, error = %e, "failed to create panorama");
            None
        }
    };

    let panorama = match stitched {
        Some(_) => Some(urls.output_url(&scene.job.output_file_name(options.format))),
        None => fallback,
    };

    SceneEntry {
        files: SceneFiles {
            meta: scene.meta_file.as_deref().map(|m| urls.input_url(&name, m)),
            cube,
            panorama,
        },
        name,
        source: TRUEVIEW_SOURCE.to_string(),
    }
}

/// Discovers every scene under `trueview_root` and catalogs it.
///
/// Only an unreadable `trueview_root` is an error; per-scene failures fall
/// back as described in [`catalog_scene`].
pub fn build_catalog(
    trueview_root: &Path,
    output_root: &Path,
    urls: &CatalogUrls,
    options: &StitchOptions,
) -> Result<Vec<SceneEntry>, JobError> {
    let scenes = discover_scenes(trueview_root)?;
    info!(root = %trueview_root.display(), scenes = scenes.len(), "building scene catalog");
    Ok(scenes
        .iter()
        .map(|scene| catalog_scene(scene, output_root, urls, options))
        .collect())
}

/// Writes `entries` as pretty-printed JSON.
pub fn write_catalog(entries: &[SceneEntry], path: &Path) -> Result<(), JobError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(entries)?;
    fs::write(path, json)?;
    Ok(())
}
