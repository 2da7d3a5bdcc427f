//! In-memory scene graph.
//!
//! `Scene` is the bundled [`SceneSink`]: it records every node the importer
//! creates, with its rest location, parent, attributes and keyframe track.
//! It is what the inspector prints and what the tests assert against.

use serde::Serialize;
use xobj_math::{Aabb, Vec3};

use crate::mesh::Mesh;
use crate::texture::{TextureInfo, TextureResolver};
use crate::xplane::{
    DatarefKey, KeyframeSample, MaterialHandle, NodeHandle, SceneSink, SinkError, SinkResult,
};

/// A material created for an OBJ `TEXTURE`.
#[derive(Clone, Debug, Serialize)]
pub struct Material {
    /// Texture name as written in the OBJ
    pub name: String,

    /// Where the texture was found
    pub texture: TextureInfo,
}

/// What a node holds.
#[derive(Clone, Debug, Serialize)]
pub enum NodeKind {
    Mesh {
        mesh: Mesh,
        material: Option<MaterialHandle>,
    },
    /// Bone proxy carrying the animation of its children
    Joint,
}

/// One time-indexed sample on a node's track.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Keyframe {
    pub frame: i32,
    pub sample: KeyframeSample,
}

/// A scene object.
#[derive(Clone, Debug, Serialize)]
pub struct Node {
    pub handle: NodeHandle,
    pub name: String,
    pub kind: NodeKind,

    /// Rest location, relative to the parent once parented
    pub location: Vec3,

    pub parent: Option<NodeHandle>,

    /// `ATTR_*` properties, in the order they were set
    pub attributes: Vec<(String, String)>,

    /// Keyframe track, in emission order
    pub keyframes: Vec<Keyframe>,
}

impl Node {
    pub fn is_joint(&self) -> bool {
        matches!(self.kind, NodeKind::Joint)
    }

    pub fn mesh(&self) -> Option<&Mesh> {
        match &self.kind {
            NodeKind::Mesh { mesh, .. } => Some(mesh),
            NodeKind::Joint => None,
        }
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Distinct dataref curves on this node's track, in first-use order.
    pub fn dataref_curves(&self) -> Vec<&DatarefKey> {
        let mut curves: Vec<&DatarefKey> = Vec::new();
        for keyframe in &self.keyframes {
            let key = keyframe.sample.dataref();
            if !curves.contains(&key) {
                curves.push(key);
            }
        }
        curves
    }
}

/// A complete imported scene: nodes in creation order plus materials.
#[derive(Debug, Default, Serialize)]
pub struct Scene {
    /// Scene name (usually from filename)
    pub name: String,

    pub nodes: Vec<Node>,

    pub materials: Vec<Material>,

    /// Time cursor last set by the importer
    pub current_frame: i32,

    #[serde(skip)]
    textures: TextureResolver,
}

impl Scene {
    /// Create an empty scene.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Texture lookup used by [`SceneSink::load_material`].
    pub fn textures_mut(&mut self) -> &mut TextureResolver {
        &mut self.textures
    }

    pub fn node(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle.0)
    }

    fn node_mut(&mut self, handle: NodeHandle) -> SinkResult<&mut Node> {
        self.nodes
            .get_mut(handle.0)
            .ok_or(SinkError::UnknownNode(handle))
    }

    /// First node with the given name.
    pub fn node_by_name(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.name == name)
    }

    pub fn children_of(&self, parent: NodeHandle) -> impl Iterator<Item = &Node> + '_ {
        self.nodes
            .iter()
            .filter(move |n| n.parent == Some(parent))
    }

    /// Nodes without a parent.
    pub fn root_nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.iter().filter(|n| n.parent.is_none())
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn mesh_count(&self) -> usize {
        self.nodes.iter().filter(|n| !n.is_joint()).count()
    }

    pub fn joint_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_joint()).count()
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    pub fn keyframe_count(&self) -> usize {
        self.nodes.iter().map(|n| n.keyframes.len()).sum()
    }

    /// Get total triangle count across all meshes.
    pub fn total_triangle_count(&self) -> usize {
        self.nodes
            .iter()
            .filter_map(Node::mesh)
            .map(Mesh::triangle_count)
            .sum()
    }

    /// Rest location in scene space, summing locations up the parent chain.
    pub fn world_location(&self, handle: NodeHandle) -> Option<Vec3> {
        let mut node = self.node(handle)?;
        let mut location = node.location;
        while let Some(parent) = node.parent {
            node = self.node(parent)?;
            location += node.location;
        }
        Some(location)
    }

    /// Compute the rest-pose bounding box of all meshes.
    pub fn world_bounds(&self) -> Aabb {
        self.nodes
            .iter()
            .filter_map(|node| {
                let mesh = node.mesh()?;
                let offset = self.world_location(node.handle)?;
                Some(mesh.bounds.translate(offset))
            })
            .fold(Aabb::empty(), |acc, b| Aabb::surrounding(&acc, &b))
    }

    fn push_node(&mut self, name: &str, kind: NodeKind, location: Vec3) -> NodeHandle {
        let handle = NodeHandle(self.nodes.len());
        self.nodes.push(Node {
            handle,
            name: name.to_string(),
            kind,
            location,
            parent: None,
            attributes: Vec::new(),
            keyframes: Vec::new(),
        });
        handle
    }

    /// True if `ancestor` is `node` or one of its parents.
    fn is_ancestor(&self, ancestor: NodeHandle, node: NodeHandle) -> bool {
        let mut current = Some(node);
        while let Some(handle) = current {
            if handle == ancestor {
                return true;
            }
            current = self.node(handle).and_then(|n| n.parent);
        }
        false
    }
}

impl SceneSink for Scene {
    fn load_material(&mut self, texture: &str) -> SinkResult<MaterialHandle> {
        if let Some(index) = self.materials.iter().position(|m| m.name == texture) {
            return Ok(MaterialHandle(index));
        }

        let info = self.textures.load(texture)?;
        let handle = MaterialHandle(self.materials.len());
        self.materials.push(Material {
            name: texture.to_string(),
            texture: info,
        });
        Ok(handle)
    }

    fn create_mesh(
        &mut self,
        name: &str,
        mesh: Mesh,
        location: Vec3,
        material: Option<MaterialHandle>,
    ) -> SinkResult<NodeHandle> {
        if let Some(handle) = material {
            if handle.0 >= self.materials.len() {
                return Err(SinkError::Rejected(format!(
                    "unknown material {:?}",
                    handle
                )));
            }
        }
        Ok(self.push_node(name, NodeKind::Mesh { mesh, material }, location))
    }

    fn create_joint(&mut self, name: &str, origin: Vec3) -> SinkResult<NodeHandle> {
        Ok(self.push_node(name, NodeKind::Joint, origin))
    }

    fn set_location(&mut self, node: NodeHandle, location: Vec3) -> SinkResult<()> {
        self.node_mut(node)?.location = location;
        Ok(())
    }

    fn set_parent(&mut self, child: NodeHandle, parent: NodeHandle) -> SinkResult<()> {
        if self.node(parent).is_none() {
            return Err(SinkError::UnknownNode(parent));
        }
        if self.is_ancestor(child, parent) {
            return Err(SinkError::Rejected(format!(
                "parenting {:?} to {:?} would create a cycle",
                child, parent
            )));
        }
        self.node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    fn set_keyframe(
        &mut self,
        node: NodeHandle,
        frame: i32,
        sample: KeyframeSample,
    ) -> SinkResult<()> {
        self.node_mut(node)?
            .keyframes
            .push(Keyframe { frame, sample });
        Ok(())
    }

    fn set_attribute(&mut self, node: NodeHandle, key: &str, value: &str) -> SinkResult<()> {
        let attributes = &mut self.node_mut(node)?.attributes;
        match attributes.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value.to_string(),
            None => attributes.push((key.to_string(), value.to_string())),
        }
        Ok(())
    }

    fn set_current_frame(&mut self, frame: i32) {
        self.current_frame = frame;
    }
}
