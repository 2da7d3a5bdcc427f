//! The interface between the importer and the host scene.
//!
//! The importer never allocates scene objects itself; it drives a
//! [`SceneSink`]. Every call can fail, and a failure only affects the node
//! it was made for.

use serde::Serialize;
use thiserror::Error;
use xobj_math::Vec3;

use super::types::VisibilityKind;
use crate::mesh::Mesh;
use crate::texture::TextureError;

/// Opaque handle to a node created by a sink.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct NodeHandle(pub usize);

/// Opaque handle to a material created by a sink.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct MaterialHandle(pub usize);

/// Errors a sink may report for a single call.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("unknown node {0:?}")]
    UnknownNode(NodeHandle),

    #[error("texture unavailable: {0}")]
    Texture(#[from] TextureError),

    #[error("rejected: {0}")]
    Rejected(String),
}

pub type SinkResult<T> = Result<T, SinkError>;

/// The dataref curve a sample belongs to.
///
/// `curve` increases every time the driving dataref changes along a node's
/// keyframe list, so consecutive samples of one dataref share a curve.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DatarefKey {
    pub curve: usize,
    pub path: String,
}

/// One time-indexed sample on a node.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum KeyframeSample {
    /// Node location, with the dataref value it corresponds to.
    Location {
        position: Vec3,
        dataref: DatarefKey,
        value: f32,
    },

    /// Node orientation as XYZ Euler angles in radians.
    Rotation {
        euler: Vec3,
        dataref: DatarefKey,
        value: f32,
    },

    /// Discrete hide/show toggle over the dataref range `[v1, v2]`.
    Visibility {
        kind: VisibilityKind,
        v1: f32,
        v2: f32,
        dataref: DatarefKey,
    },
}

impl KeyframeSample {
    pub fn dataref(&self) -> &DatarefKey {
        match self {
            KeyframeSample::Location { dataref, .. }
            | KeyframeSample::Rotation { dataref, .. }
            | KeyframeSample::Visibility { dataref, .. } => dataref,
        }
    }
}

/// Host scene operations needed to materialize an imported model.
///
/// Calls arrive in dependency order: a node is always created before it is
/// positioned, parented or keyed, and parents are created before children.
pub trait SceneSink {
    /// Create a material for a texture file named in the OBJ.
    fn load_material(&mut self, texture: &str) -> SinkResult<MaterialHandle>;

    /// Create a mesh object at `location`.
    fn create_mesh(
        &mut self,
        name: &str,
        mesh: Mesh,
        location: Vec3,
        material: Option<MaterialHandle>,
    ) -> SinkResult<NodeHandle>;

    /// Create a joint (bone proxy) whose rest position is `origin`.
    fn create_joint(&mut self, name: &str, origin: Vec3) -> SinkResult<NodeHandle>;

    /// Set a node's rest location. After `set_parent` it is relative to the parent.
    fn set_location(&mut self, node: NodeHandle, location: Vec3) -> SinkResult<()>;

    /// Make `child` a child of `parent`.
    fn set_parent(&mut self, child: NodeHandle, parent: NodeHandle) -> SinkResult<()>;

    fn set_keyframe(&mut self, node: NodeHandle, frame: i32, sample: KeyframeSample)
        -> SinkResult<()>;

    /// Attach an opaque `ATTR_*` property.
    fn set_attribute(&mut self, node: NodeHandle, key: &str, value: &str) -> SinkResult<()>;

    /// Move the host's time cursor. Called once a node's keyframes are written.
    fn set_current_frame(&mut self, _frame: i32) {}
}
