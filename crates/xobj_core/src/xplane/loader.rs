//! High-level X-Plane OBJ loading.
//!
//! This module provides the entry points that take OBJ text (or a file),
//! run both passes and drive a [`SceneSink`].

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::parser::{parse_xplane_obj, ParseError};
use super::report::ImportReport;
use super::resolver::SceneResolver;
use super::sink::SceneSink;
use crate::scene::Scene;

/// Errors that can occur during OBJ loading.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
}

/// Result type for loading operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Settings for the keyframe time axis.
///
/// Missing fields take their default, so a partial JSON file is accepted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportOptions {
    /// Frame of the first location/rotation sample
    pub first_frame: i32,

    /// Frames between consecutive location/rotation samples
    pub frame_step: i32,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            first_frame: 1,
            frame_step: 2,
        }
    }
}

/// Import OBJ text into `sink`.
///
/// A parse error aborts before anything reaches the sink. Sink failures are
/// collected as warnings in the returned report.
///
/// # Example
///
/// ```ignore
/// use xobj_core::{import_xplane_obj, ImportOptions, Scene};
///
/// let mut scene = Scene::new("door");
/// let report = import_xplane_obj(&text, &mut scene, &ImportOptions::default())?;
/// println!("{} objects, {} joints", report.object_count, report.joint_count);
/// ```
pub fn import_xplane_obj<S: SceneSink>(
    content: &str,
    sink: &mut S,
    options: &ImportOptions,
) -> LoadResult<ImportReport> {
    let model = parse_xplane_obj(content)?;
    Ok(SceneResolver::new(sink, options).resolve(model))
}

/// Read an OBJ file and import it into `sink`.
pub fn load_xplane_obj<P: AsRef<Path>, S: SceneSink>(
    path: P,
    sink: &mut S,
    options: &ImportOptions,
) -> LoadResult<ImportReport> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    log::info!("Importing {}", path.display());
    import_xplane_obj(&content, sink, options)
}

/// Load an OBJ file into a new [`Scene`].
///
/// The scene is named after the file stem and looks up textures next to
/// the file.
pub fn load_scene<P: AsRef<Path>>(
    path: P,
    options: &ImportOptions,
) -> LoadResult<(Scene, ImportReport)> {
    let path = path.as_ref();
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unnamed");

    let mut scene = Scene::new(name);
    if let Some(dir) = path.parent() {
        scene.textures_mut().set_base_dir(dir);
    }

    let report = load_xplane_obj(path, &mut scene, options)?;
    Ok((scene, report))
}
