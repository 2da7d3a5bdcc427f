//! X-Plane OBJ (version 800) import.
//!
//! Import runs in two passes:
//!
//! 1. [`parse_xplane_obj`] reads the instruction stream into a
//!    [`ParsedModel`]: global vertex/index buffers, a tree of animation
//!    blocks and the mesh records produced by `TRIS`.
//! 2. [`SceneResolver`] decides which blocks need a joint, computes pivots
//!    and drives a [`SceneSink`], emitting keyframes through
//!    [`KeyframeEmitter`].
//!
//! Malformed input aborts with a [`ParseError`] before anything reaches the
//! sink. Everything after that is best effort: problems are collected as
//! [`ImportWarning`]s in the [`ImportReport`].
//!
//! ## Coordinates
//!
//! OBJ files are Y-up; the scene is Z-up. Points, normals, translations and
//! `ANIM_rotate_begin` axes map `(x, y, z)` to `(x, -z, y)`. `ANIM_rotate`
//! axes map to `(x, z, y)`.
//!
//! ## Not Supported
//!
//! - `LINES`, `LIGHTS` and other non-triangle geometry
//! - LOD ranges (kept as plain `ATTR_LOD` attributes)
//! - Writing OBJ files
//!
//! # Example
//!
//! ```ignore
//! use xobj_core::xplane::{load_scene, ImportOptions};
//!
//! let (scene, report) = load_scene("door.obj", &ImportOptions::default())?;
//! println!("{} objects, {} joints", report.object_count, report.joint_count);
//! ```

mod geometry;
mod keyframes;
mod loader;
mod parser;
mod report;
mod resolver;
mod sink;
mod tokens;
mod types;

pub use geometry::*;
pub use keyframes::*;
pub use loader::*;
pub use parser::*;
pub use report::*;
pub use resolver::*;
pub use sink::*;
pub use tokens::*;
pub use types::*;
