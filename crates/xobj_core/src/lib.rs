//! xobj core - X-Plane OBJ import into an animated scene graph.
//!
//! This crate provides:
//!
//! - **X-Plane import**: OBJ parsing, joint resolution and keyframe emission
//!   against a host-provided [`SceneSink`]
//! - **Scene graph types**: an in-memory `Scene` sink with `Node`, `Mesh`
//!   and `Material`
//! - **Texture resolution**: texture lookup with a `.dds` fallback
//!
//! # Example
//!
//! ```ignore
//! use xobj_core::{load_scene, ImportOptions};
//!
//! let (scene, report) = load_scene("cockpit.obj", &ImportOptions::default())?;
//! println!("Loaded {} nodes, {} warnings",
//!     scene.node_count(),
//!     report.warnings.len());
//! ```

pub mod mesh;
pub mod scene;
pub mod texture;
pub mod xplane;

// Re-export commonly used types
pub use mesh::Mesh;
pub use scene::{Keyframe, Material, Node, NodeKind, Scene};
pub use texture::{TextureError, TextureInfo, TextureResolver};
pub use xplane::{
    import_xplane_obj, load_scene, load_xplane_obj, ImportOptions, ImportReport, ImportWarning,
    LoadError, SceneSink,
};
