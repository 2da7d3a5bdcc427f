//! Scene graph resolution (pass 2).
//!
//! Once the whole block tree is known, decide which blocks become joints,
//! compute pivots, and materialize everything through a [`SceneSink`]:
//!
//! 1. A block needs a joint if it has keyframes or a child that needs one.
//!    Other blocks decay and hand their meshes to the nearest joint
//!    ancestor, or to the loose list.
//! 2. Joints are created at their pivot, parents first, each followed by
//!    its meshes (re-centered on the pivot and parented to the joint).
//! 3. Joint-to-joint edges are set once every joint exists, with the child
//!    location made relative to the parent pivot.
//! 4. Joint keyframes are emitted, then loose meshes are created.
//!
//! A failed sink call skips that node only and is reported as a warning. A
//! node whose parenting fails stays top-level at its scene-space pivot.

use xobj_math::Vec3;

use super::geometry::GeometryAccumulator;
use super::keyframes::KeyframeEmitter;
use super::loader::ImportOptions;
use super::report::{ImportReport, ImportWarning};
use super::sink::{MaterialHandle, NodeHandle, SceneSink, SinkError};
use super::types::{AnimationBlock, BlockId, KeyframeEvent, MeshRecord, ParsedModel};

/// Pivot of an event list: the first position of the translation run
/// directly before the first rotation.
///
/// An animated `ANIM_trans` pivots at its start point. Visibility events do
/// not break a run. Zero when there is no rotation or nothing translates
/// before it.
pub fn rotation_pivot(events: &[KeyframeEvent]) -> Vec3 {
    let mut pivot = Vec3::ZERO;
    let mut in_run = false;
    for event in events {
        match event {
            KeyframeEvent::Translate { position, .. } => {
                if !in_run {
                    pivot = *position;
                    in_run = true;
                }
            }
            KeyframeEvent::Rotate { .. } => return pivot,
            KeyframeEvent::Visibility { .. } => {}
        }
    }
    Vec3::ZERO
}

/// A block that will be materialized as a joint.
#[derive(Debug)]
pub struct PlannedJoint<'a> {
    pub block: &'a AnimationBlock,
    pub pivot: Vec3,
    /// Index of the parent joint in [`ScenePlan::joints`]
    pub parent: Option<usize>,
    /// Own meshes plus those of decayed descendants, in source order
    pub meshes: Vec<&'a MeshRecord>,
}

/// What pass 2 will create, before any sink call.
#[derive(Debug)]
pub struct ScenePlan<'a> {
    /// Joints in block order, parents first
    pub joints: Vec<PlannedJoint<'a>>,
    /// Meshes with no joint ancestor, in source order
    pub loose: Vec<&'a MeshRecord>,
}

impl<'a> ScenePlan<'a> {
    pub fn new(model: &'a ParsedModel) -> Self {
        let blocks = &model.blocks;

        // Children always have larger ids than their parent
        let mut needs_joint = vec![false; blocks.len()];
        for block in blocks.iter().rev() {
            let animated_child = block.children.iter().any(|c| needs_joint[c.0]);
            needs_joint[block.id.0] = animated_child || !block.keyframes.is_empty();
        }

        let mut reachable = Vec::new();
        let mut stack: Vec<BlockId> = model.roots.clone();
        while let Some(id) = stack.pop() {
            reachable.push(id);
            stack.extend(model.block(id).children.iter().copied());
        }
        reachable.sort();

        let mut joint_index: Vec<Option<usize>> = vec![None; blocks.len()];
        let mut joints = Vec::new();
        for &id in reachable.iter().filter(|id| needs_joint[id.0]) {
            joint_index[id.0] = Some(joints.len());
            let block = model.block(id);
            joints.push(PlannedJoint {
                block,
                pivot: rotation_pivot(&block.keyframes),
                parent: None,
                meshes: Vec::new(),
            });
        }

        let nearest_joint = |start: Option<BlockId>| {
            let mut current = start;
            while let Some(id) = current {
                if let Some(index) = joint_index[id.0] {
                    return Some(index);
                }
                current = model.block(id).parent;
            }
            None
        };

        for joint in joints.iter_mut() {
            joint.parent = nearest_joint(joint.block.parent);
        }

        let mut loose: Vec<&MeshRecord> = model.loose.iter().collect();
        for &id in &reachable {
            let meshes = &model.block(id).meshes;
            match nearest_joint(Some(id)) {
                Some(index) => joints[index].meshes.extend(meshes),
                None => {
                    if !meshes.is_empty() {
                        log::debug!(
                            "block `{}` has no animation, promoting {} mesh(es)",
                            model.block(id).label,
                            meshes.len()
                        );
                    }
                    loose.extend(meshes);
                }
            }
        }

        for joint in joints.iter_mut() {
            joint.meshes.sort_by_key(|m| m.line);
        }
        loose.sort_by_key(|m| m.line);

        Self { joints, loose }
    }
}

/// Drives a [`SceneSink`] from a parsed model.
pub struct SceneResolver<'s, S: SceneSink> {
    sink: &'s mut S,
    emitter: KeyframeEmitter,
    report: ImportReport,
}

impl<'s, S: SceneSink> SceneResolver<'s, S> {
    pub fn new(sink: &'s mut S, options: &ImportOptions) -> Self {
        Self {
            sink,
            emitter: KeyframeEmitter::from_options(options),
            report: ImportReport::default(),
        }
    }

    /// Materialize `model` and return the import report.
    pub fn resolve(mut self, mut model: ParsedModel) -> ImportReport {
        self.report.warnings = std::mem::take(&mut model.warnings);

        let material = model
            .texture
            .as_deref()
            .and_then(|texture| self.load_material(texture));

        let plan = ScenePlan::new(&model);
        let geometry = &model.geometry;

        // Joints, each followed by its meshes
        let mut handles: Vec<Option<NodeHandle>> = Vec::with_capacity(plan.joints.len());
        for joint in &plan.joints {
            let label = &joint.block.label;
            let handle = match self.sink.create_joint(label, joint.pivot) {
                Ok(handle) => {
                    self.report.joint_count += 1;
                    Some(handle)
                }
                Err(e) => {
                    self.collaborator(label, e);
                    None
                }
            };
            handles.push(handle);

            for record in &joint.meshes {
                match handle {
                    Some(parent) => {
                        if let Some(mesh) =
                            self.create_mesh(geometry, record, joint.pivot, Vec3::ZERO, material)
                        {
                            if let Err(e) = self.sink.set_parent(mesh, parent) {
                                self.collaborator(&record.label, e);
                                // Top-level mesh, placed at the pivot it was centered on
                                if let Err(e) = self.sink.set_location(mesh, joint.pivot) {
                                    self.collaborator(&record.label, e);
                                }
                                self.report.object_count += 1;
                            }
                        }
                    }
                    None => {
                        let created =
                            self.create_mesh(geometry, record, joint.pivot, joint.pivot, material);
                        if created.is_some() {
                            self.report.object_count += 1;
                        }
                    }
                }
            }
        }

        // Joint-to-joint edges
        for (joint, handle) in plan.joints.iter().zip(&handles) {
            let Some(child) = *handle else { continue };
            let parent = joint
                .parent
                .and_then(|index| Some((handles[index]?, plan.joints[index].pivot)));
            let linked = match parent {
                Some(parent) => match self.link(child, joint.pivot, parent) {
                    Ok(()) => true,
                    Err(e) => {
                        self.collaborator(&joint.block.label, e);
                        false
                    }
                },
                None => false,
            };
            if !linked {
                self.report.object_count += 1;
            }
        }

        for (joint, handle) in plan.joints.iter().zip(&handles) {
            if let Some(handle) = *handle {
                self.emit(&joint.block.label, handle, &joint.block.keyframes);
            }
        }

        for record in &plan.loose {
            let pivot = rotation_pivot(&record.keyframes);
            if let Some(handle) = self.create_mesh(geometry, record, pivot, pivot, material) {
                self.report.object_count += 1;
                if !record.keyframes.is_empty() {
                    self.emit(&record.label, handle, &record.keyframes);
                }
            }
        }

        log::info!(
            "Imported {} object(s): {} joint(s), {} mesh(es), {} keyframe(s), {} warning(s)",
            self.report.object_count,
            self.report.joint_count,
            self.report.mesh_count,
            self.report.keyframe_count,
            self.report.warnings.len()
        );

        self.report
    }

    fn load_material(&mut self, texture: &str) -> Option<MaterialHandle> {
        match self.sink.load_material(texture) {
            Ok(handle) => Some(handle),
            Err(e) => {
                self.collaborator(texture, e);
                None
            }
        }
    }

    /// Create one mesh re-centered on `pivot`, then forward its attributes.
    fn create_mesh(
        &mut self,
        geometry: &GeometryAccumulator,
        record: &MeshRecord,
        pivot: Vec3,
        location: Vec3,
        material: Option<MaterialHandle>,
    ) -> Option<NodeHandle> {
        let mesh = geometry.extract_mesh(&record.faces, pivot);
        let degenerate = mesh.degenerate_triangle_count();
        if degenerate > 0 {
            log::debug!("`{}` has {} degenerate triangle(s)", record.label, degenerate);
        }

        let handle = match self
            .sink
            .create_mesh(&record.label, mesh, location, material)
        {
            Ok(handle) => handle,
            Err(e) => {
                self.collaborator(&record.label, e);
                return None;
            }
        };
        self.report.mesh_count += 1;

        for (key, value) in &record.attributes {
            if let Err(e) = self.sink.set_attribute(handle, key, value) {
                self.collaborator(&record.label, e);
            }
        }
        Some(handle)
    }

    /// Make `child` relative to its parent joint and parent it.
    ///
    /// If parenting fails the child keeps its scene-space location.
    fn link(
        &mut self,
        child: NodeHandle,
        pivot: Vec3,
        (parent, parent_pivot): (NodeHandle, Vec3),
    ) -> Result<(), SinkError> {
        self.sink.set_location(child, pivot - parent_pivot)?;
        if let Err(e) = self.sink.set_parent(child, parent) {
            // Back to scene space as a top-level node
            if let Err(restore) = self.sink.set_location(child, pivot) {
                log::warn!("Could not restore location of node {}: {}", child.0, restore);
            }
            return Err(e);
        }
        Ok(())
    }

    fn emit(&mut self, label: &str, node: NodeHandle, events: &[KeyframeEvent]) {
        match self.emitter.emit(&mut *self.sink, node, events) {
            Ok(count) => self.report.keyframe_count += count,
            Err(e) => self.collaborator(label, e),
        }
    }

    fn collaborator(&mut self, node: &str, source: SinkError) {
        self.report.warn(ImportWarning::Collaborator {
            node: node.to_string(),
            source,
        });
    }
}
