//! Intermediate representation produced by the X-Plane OBJ parser.
//!
//! These types describe the raw instruction stream after pass 1: global
//! geometry, the tree of animation blocks, and mesh records. They are turned
//! into scene nodes by the resolver.

use serde::Serialize;
use xobj_math::Vec3;

use super::geometry::GeometryAccumulator;
use super::report::ImportWarning;

/// Dataref value that marks a disabled animation channel.
pub const DISABLED_DATAREF: &str = "none";

/// One `VT` record, already converted to scene axes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub uv: [f32; 2],
}

/// Three indices into the global vertex list.
pub type Face = [u32; 3];

/// Direction of an `ANIM_hide` / `ANIM_show` toggle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum VisibilityKind {
    Hide,
    Show,
}

/// A single animation instruction inside a block.
///
/// The order of events in a block is the order of the time axis.
#[derive(Clone, Debug, PartialEq)]
pub enum KeyframeEvent {
    /// Location key: `position` when the dataref reads `value`.
    Translate {
        position: Vec3,
        value: f32,
        dataref: String,
    },

    /// Rotation key about a unit axis (already permuted to scene axes).
    Rotate {
        axis: Vec3,
        value: f32,
        angle_degrees: f32,
        dataref: String,
    },

    /// Hide or show the geometry while the dataref is within `[v1, v2]`.
    Visibility {
        kind: VisibilityKind,
        v1: f32,
        v2: f32,
        dataref: String,
    },
}

impl KeyframeEvent {
    pub fn dataref(&self) -> &str {
        match self {
            KeyframeEvent::Translate { dataref, .. }
            | KeyframeEvent::Rotate { dataref, .. }
            | KeyframeEvent::Visibility { dataref, .. } => dataref,
        }
    }

    /// True for events driven by the `none` dataref.
    pub fn is_disabled(&self) -> bool {
        self.dataref() == DISABLED_DATAREF
    }
}

/// Geometry emitted by one `TRIS` instruction.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshRecord {
    /// Debug label, or a generated `OBJ<N>`
    pub label: String,

    /// Faces referencing the global vertex list
    pub faces: Vec<Face>,

    /// `ATTR_*` state in effect at the `TRIS`
    pub attributes: Vec<(String, String)>,

    /// Object-level keyframes (only for meshes outside any block)
    pub keyframes: Vec<KeyframeEvent>,

    /// Source line of the `TRIS`
    pub line: usize,
}

/// Index of a block in [`ParsedModel::blocks`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub usize);

/// One `ANIM_begin ... ANIM_end` nesting level.
#[derive(Clone, Debug, PartialEq)]
pub struct AnimationBlock {
    pub id: BlockId,
    pub label: String,
    /// Source line of the `ANIM_begin`
    pub line: usize,
    pub keyframes: Vec<KeyframeEvent>,
    pub meshes: Vec<MeshRecord>,
    /// Enclosing block, set when this block is closed inside another one
    pub parent: Option<BlockId>,
    pub children: Vec<BlockId>,
}

impl AnimationBlock {
    pub fn new(id: BlockId, label: String, line: usize) -> Self {
        Self {
            id,
            label,
            line,
            keyframes: Vec::new(),
            meshes: Vec::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    /// True if the block holds geometry or nested blocks.
    pub fn owns_content(&self) -> bool {
        !self.meshes.is_empty() || !self.children.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        !self.owns_content() && self.keyframes.is_empty()
    }
}

/// Result of pass 1 over an OBJ file.
#[derive(Debug)]
pub struct ParsedModel {
    pub geometry: GeometryAccumulator,

    /// Last `TEXTURE` seen, shared by every mesh
    pub texture: Option<String>,

    /// Every block in `ANIM_begin` order (parents before children)
    pub blocks: Vec<AnimationBlock>,

    /// Top-level blocks that survived closing
    pub roots: Vec<BlockId>,

    /// Meshes outside any block
    pub loose: Vec<MeshRecord>,

    /// Non-fatal issues found while parsing
    pub warnings: Vec<ImportWarning>,
}

impl ParsedModel {
    pub fn block(&self, id: BlockId) -> &AnimationBlock {
        &self.blocks[id.0]
    }

    /// Labels of every block reachable from the roots, in depth-first order.
    pub fn block_labels(&self) -> Vec<&str> {
        let mut labels = Vec::new();
        let mut stack: Vec<BlockId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let block = self.block(id);
            labels.push(block.label.as_str());
            stack.extend(block.children.iter().rev().copied());
        }
        labels
    }
}
