//! Scene catalog boundary.
//!
//! Turns scan output directories into stitch jobs, runs them idempotently
//! and produces the scene entries the viewer reads (`files.panorama`).

mod job;
mod scan;
mod scene;

use thiserror::Error;

use crate::export::ExportError;
use crate::stitch::StitchError;

pub use job::{stitch_if_absent, stitch_job, SceneStitchJob, StitchOutcome};
pub use scan::{discover_scenes, DiscoveredScene};
pub use scene::{
    build_catalog, catalog_scene, write_catalog, CatalogUrls, SceneEntry, SceneFiles,
    TRUEVIEW_SOURCE,
};

/// Errors that can occur while running stitch jobs.
#[derive(Error, Debug)]
pub enum JobError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid job description: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid scene name {0:?}")]
    InvalidScene(String),
    #[error(transparent)]
    Stitch(#[from] StitchError),
    #[error("Failed to write panorama: {0}")]
    Export(#[from] ExportError),
}
