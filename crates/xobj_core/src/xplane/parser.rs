//! X-Plane OBJ instruction interpreter (pass 1).
//!
//! The parser walks the file once, line by line, and keeps all of its state
//! in [`ParserState`]:
//!
//! - `VT` / `IDX` / `IDX10` fill the global [`GeometryAccumulator`]
//! - `ANIM_begin` / `ANIM_end` push and pop a stack of [`AnimationBlock`]s
//! - `ANIM_trans`, `ANIM_rotate`, `ANIM_hide`, `ANIM_show` and the keyed
//!   `*_begin` / `*_key` / `*_end` forms append events to the open block
//! - `TRIS` records a mesh on the open block, or as a loose mesh
//! - `#` comments name the next block or mesh
//!
//! Whether a block becomes a joint is decided later by the resolver, once
//! the whole tree is known.
//!
//! # Supported Syntax
//!
//! - `TEXTURE <file>`
//! - `POINT_COUNTS <vt> <lines> <lights> <idx>`
//! - `VT <x> <y> <z> <nx> <ny> <nz> <u> <v>`
//! - `IDX <i>` / `IDX10 <i0> ... <i9>`
//! - `ANIM_trans <x1> <y1> <z1> <x2> <y2> <z2> [<v1> <v2> <dataref>]`
//! - `ANIM_trans_begin <dataref>`, `ANIM_trans_key <v> <x> <y> <z>`, `ANIM_trans_end`
//! - `ANIM_rotate <x> <y> <z> <r1> <r2> <v1> <v2> [<dataref>]`
//! - `ANIM_rotate_begin <x> <y> <z> <dataref>`, `ANIM_rotate_key <v> <angle>`, `ANIM_rotate_end`
//! - `ANIM_hide <v1> <v2> <dataref>`, `ANIM_show <v1> <v2> <dataref>`
//! - `ATTR_*` (stored verbatim), `ATTR_reset`
//! - `TRIS <offset> <count>`
//!
//! Anything else is ignored.

use thiserror::Error;
use xobj_math::{xplane_point, xplane_rotate_axis, Vec3};

use super::geometry::{GeometryAccumulator, GeometryError};
use super::report::ImportWarning;
use super::tokens::{tokenize, Line};
use super::types::{
    AnimationBlock, BlockId, KeyframeEvent, MeshRecord, ParsedModel, VisibilityKind,
    DISABLED_DATAREF,
};

/// Fatal errors in the instruction stream. Each names the offending line.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("line {line}: malformed `{keyword}`: {reason}")]
    MalformedInstruction {
        line: usize,
        keyword: String,
        reason: String,
    },

    #[error("line {line}: `{keyword}` field {field} is not a number: {value:?}")]
    NumericConversion {
        line: usize,
        keyword: String,
        field: usize,
        value: String,
    },

    #[error("line {line}: `{keyword}` index out of range: {source}")]
    IndexOutOfRange {
        line: usize,
        keyword: String,
        #[source]
        source: GeometryError,
    },
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Whether the parser is inside an animation block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockState {
    Idle,
    InBlock(usize),
}

/// Template opened by `ANIM_trans_begin` / `ANIM_rotate_begin`.
#[derive(Clone, Debug, PartialEq)]
enum PendingKey {
    Translate { dataref: String },
    Rotate { axis: Vec3, dataref: String },
}

/// Declared `POINT_COUNTS`.
#[derive(Clone, Copy, Debug)]
struct PointCounts {
    vertices: usize,
    indices: usize,
}

/// Mutable state threaded through every instruction.
#[derive(Debug, Default)]
pub struct ParserState {
    geometry: GeometryAccumulator,
    texture: Option<String>,
    point_counts: Option<PointCounts>,

    /// Block arena, in `ANIM_begin` order
    blocks: Vec<AnimationBlock>,
    /// Currently open blocks, innermost last
    stack: Vec<BlockId>,
    roots: Vec<BlockId>,
    loose: Vec<MeshRecord>,

    /// Debug label waiting for the next block or mesh
    pending_label: Option<String>,
    pending_key: Option<PendingKey>,
    /// Events seen outside any block, waiting for the next loose mesh
    pending_keyframes: Vec<KeyframeEvent>,
    /// `ATTR_*` state applied to every following `TRIS`
    attributes: Vec<(String, String)>,

    armature_counter: usize,
    mesh_counter: usize,
    warnings: Vec<ImportWarning>,
}

impl ParserState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> BlockState {
        match self.stack.len() {
            0 => BlockState::Idle,
            depth => BlockState::InBlock(depth),
        }
    }

    pub fn geometry(&self) -> &GeometryAccumulator {
        &self.geometry
    }

    /// Interpret one instruction.
    pub fn feed(&mut self, line: &Line) -> ParseResult<()> {
        match line.keyword {
            "TEXTURE" => {
                self.texture = Some(line.text(0)?.to_string());
            }
            "POINT_COUNTS" => self.point_counts(line)?,
            "VT" => self.vertex(line)?,
            "IDX" | "IDX10" => {
                let indices = (0..line.fields.len())
                    .map(|i| line.number::<u32>(i))
                    .collect::<ParseResult<Vec<_>>>()?;
                self.geometry.add_indices(indices);
            }
            "#" => {
                let label = line.joined("_");
                if !label.is_empty() {
                    self.pending_label = Some(label);
                }
            }
            "ANIM_begin" => self.begin_block(line),
            "ANIM_end" => self.end_block(line),
            "ANIM_trans" => self.translate(line)?,
            "ANIM_trans_begin" => {
                self.pending_key = Some(PendingKey::Translate {
                    dataref: line.text(0)?.to_string(),
                });
            }
            "ANIM_trans_key" => self.translate_key(line)?,
            "ANIM_rotate" => self.rotate(line)?,
            "ANIM_rotate_begin" => {
                line.require(4)?;
                let [x, y, z] = line.floats::<3>(0)?;
                self.pending_key = Some(PendingKey::Rotate {
                    axis: xplane_point(x, y, z),
                    dataref: line.text(3)?.to_string(),
                });
            }
            "ANIM_rotate_key" => self.rotate_key(line)?,
            "ANIM_trans_end" | "ANIM_rotate_end" => {
                self.pending_key = None;
            }
            "ANIM_hide" => self.visibility(line, VisibilityKind::Hide)?,
            "ANIM_show" => self.visibility(line, VisibilityKind::Show)?,
            "TRIS" => self.tris(line)?,
            "ATTR_reset" => self.attributes.clear(),
            keyword if keyword.starts_with("ATTR_") => {
                self.set_attribute(keyword, line.joined(" "));
            }
            _ => {
                log::trace!("line {}: ignoring `{}`", line.number, line.keyword);
            }
        }
        Ok(())
    }

    fn point_counts(&mut self, line: &Line) -> ParseResult<()> {
        line.require(4)?;
        let vertices = line.number::<usize>(0)?;
        let indices = line.number::<usize>(3)?;
        self.geometry.reserve(vertices, indices);
        self.point_counts = Some(PointCounts { vertices, indices });
        Ok(())
    }

    fn vertex(&mut self, line: &Line) -> ParseResult<()> {
        let [x, y, z, nx, ny, nz, u, v] = line.floats::<8>(0)?;
        self.geometry
            .add_vertex(xplane_point(x, y, z), xplane_point(nx, ny, nz), [u, v]);
        Ok(())
    }

    fn begin_block(&mut self, line: &Line) {
        let label = self.pending_label.take().unwrap_or_else(|| {
            let label = format!("ARM{}", self.armature_counter);
            self.armature_counter += 1;
            label
        });
        let id = BlockId(self.blocks.len());
        log::debug!(
            "line {}: open block `{}` at depth {}",
            line.number,
            label,
            self.stack.len() + 1
        );
        self.blocks.push(AnimationBlock::new(id, label, line.number));
        self.stack.push(id);
    }

    fn end_block(&mut self, line: &Line) {
        match self.stack.pop() {
            Some(id) => self.close_block(id),
            None => self.warn(ImportWarning::UnbalancedBlockMarker { line: line.number }),
        }
    }

    /// Link a popped block into the tree.
    ///
    /// A nested block with no geometry and no children cannot carry its own
    /// joint; its events are appended to the enclosing block instead.
    fn close_block(&mut self, id: BlockId) {
        let owns_content = self.blocks[id.0].owns_content();
        match self.stack.last().copied() {
            Some(parent) if owns_content => {
                self.blocks[id.0].parent = Some(parent);
                self.blocks[parent.0].children.push(id);
            }
            Some(parent) => {
                let events = std::mem::take(&mut self.blocks[id.0].keyframes);
                if !events.is_empty() {
                    log::debug!(
                        "merging {} event(s) of `{}` into `{}`",
                        events.len(),
                        self.blocks[id.0].label,
                        self.blocks[parent.0].label
                    );
                }
                self.blocks[parent.0].keyframes.extend(events);
            }
            None if self.blocks[id.0].is_empty() => {
                log::debug!("dropping empty block `{}`", self.blocks[id.0].label);
            }
            None => self.roots.push(id),
        }
    }

    /// Append an event to the open block, or hold it for the next loose mesh.
    fn push_event(&mut self, event: KeyframeEvent) {
        match self.stack.last() {
            Some(top) => self.blocks[top.0].keyframes.push(event),
            None => self.pending_keyframes.push(event),
        }
    }

    fn translate(&mut self, line: &Line) -> ParseResult<()> {
        let field_count = line.fields.len();
        if field_count != 6 && field_count < 9 {
            return Err(line.malformed(format!(
                "expects 6 or 9 fields, found {}",
                field_count
            )));
        }

        let [x1, y1, z1, x2, y2, z2] = line.floats::<6>(0)?;
        let (v1, v2, dataref) = if field_count >= 9 {
            let [v1, v2] = line.floats::<2>(6)?;
            (v1, v2, line.text(8)?)
        } else {
            (0.0, 0.0, DISABLED_DATAREF)
        };

        self.push_event(KeyframeEvent::Translate {
            position: xplane_point(x1, y1, z1),
            value: v1,
            dataref: dataref.to_string(),
        });
        self.push_event(KeyframeEvent::Translate {
            position: xplane_point(x2, y2, z2),
            value: v2,
            dataref: dataref.to_string(),
        });
        Ok(())
    }

    fn translate_key(&mut self, line: &Line) -> ParseResult<()> {
        line.require(4)?;
        let dataref = match &self.pending_key {
            Some(PendingKey::Translate { dataref }) => dataref.clone(),
            _ => return Err(line.malformed("no open ANIM_trans_begin")),
        };
        let [value, x, y, z] = line.floats::<4>(0)?;
        self.push_event(KeyframeEvent::Translate {
            position: xplane_point(x, y, z),
            value,
            dataref,
        });
        Ok(())
    }

    fn rotate(&mut self, line: &Line) -> ParseResult<()> {
        let [x, y, z, r1, r2, v1, v2] = line.floats::<7>(0)?;
        let dataref = line.fields.get(7).copied().unwrap_or(DISABLED_DATAREF);
        let axis = xplane_rotate_axis(x, y, z);

        self.push_event(KeyframeEvent::Rotate {
            axis,
            value: v1,
            angle_degrees: r1,
            dataref: dataref.to_string(),
        });
        self.push_event(KeyframeEvent::Rotate {
            axis,
            value: v2,
            angle_degrees: r2,
            dataref: dataref.to_string(),
        });
        Ok(())
    }

    fn rotate_key(&mut self, line: &Line) -> ParseResult<()> {
        line.require(2)?;
        let (axis, dataref) = match &self.pending_key {
            Some(PendingKey::Rotate { axis, dataref }) => (*axis, dataref.clone()),
            _ => return Err(line.malformed("no open ANIM_rotate_begin")),
        };
        let [value, angle_degrees] = line.floats::<2>(0)?;
        self.push_event(KeyframeEvent::Rotate {
            axis,
            value,
            angle_degrees,
            dataref,
        });
        Ok(())
    }

    fn visibility(&mut self, line: &Line, kind: VisibilityKind) -> ParseResult<()> {
        line.require(3)?;
        let [v1, v2] = line.floats::<2>(0)?;
        self.push_event(KeyframeEvent::Visibility {
            kind,
            v1,
            v2,
            dataref: line.text(2)?.to_string(),
        });
        Ok(())
    }

    fn set_attribute(&mut self, key: &str, value: String) {
        match self.attributes.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value,
            None => self.attributes.push((key.to_string(), value)),
        }
    }

    fn tris(&mut self, line: &Line) -> ParseResult<()> {
        line.require(2)?;
        let offset = line.number::<usize>(0)?;
        let count = line.number::<usize>(1)?;
        if count % 3 != 0 {
            return Err(line.malformed(format!("count {} is not a multiple of 3", count)));
        }

        let faces = self
            .geometry
            .slice_faces(offset, count)
            .map_err(|source| ParseError::IndexOutOfRange {
                line: line.number,
                keyword: line.keyword.to_string(),
                source,
            })?;

        let label = self
            .pending_label
            .take()
            .unwrap_or_else(|| format!("OBJ{}", self.mesh_counter));
        self.mesh_counter += 1;

        let mut record = MeshRecord {
            label,
            faces,
            attributes: self.attributes.clone(),
            keyframes: Vec::new(),
            line: line.number,
        };

        match self.stack.last() {
            Some(top) => self.blocks[top.0].meshes.push(record),
            None => {
                record.keyframes = std::mem::take(&mut self.pending_keyframes);
                self.loose.push(record);
            }
        }
        Ok(())
    }

    fn warn(&mut self, warning: ImportWarning) {
        log::warn!("{}", warning);
        self.warnings.push(warning);
    }

    /// Close anything left open and hand over the parsed model.
    pub fn finish(mut self) -> ParsedModel {
        while let Some(id) = self.stack.pop() {
            let block = &self.blocks[id.0];
            let warning = ImportWarning::UnclosedBlock {
                label: block.label.clone(),
                line: block.line,
            };
            self.warn(warning);
            self.close_block(id);
        }

        if !self.pending_keyframes.is_empty() {
            let count = self.pending_keyframes.len();
            self.warn(ImportWarning::DiscardedKeyframes { count });
        }

        if let Some(declared) = self.point_counts {
            let checks = [
                ("vertices", declared.vertices, self.geometry.vertex_count()),
                ("indices", declared.indices, self.geometry.index_count()),
            ];
            for (what, declared, found) in checks {
                if declared != found {
                    self.warn(ImportWarning::PointCountMismatch {
                        what,
                        declared,
                        found,
                    });
                }
            }
        }

        log::info!(
            "Parsed {} vertices, {} indices, {} block(s), {} mesh record(s)",
            self.geometry.vertex_count(),
            self.geometry.index_count(),
            self.blocks.len(),
            self.mesh_counter
        );

        ParsedModel {
            geometry: self.geometry,
            texture: self.texture,
            blocks: self.blocks,
            roots: self.roots,
            loose: self.loose,
            warnings: self.warnings,
        }
    }
}

/// Parse OBJ text into the intermediate model.
pub fn parse_xplane_obj(content: &str) -> ParseResult<ParsedModel> {
    let mut state = ParserState::new();
    for line in tokenize(content) {
        state.feed(&line)?;
    }
    Ok(state.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIANGLE: &str = r#"
I
800
OBJ

VT 0 0 0 0 1 0 0 0
VT 1 0 0 0 1 0 1 0
VT 0 0 1 0 1 0 0 1
IDX 0
IDX 1
IDX 2
"#;

    fn with_triangle(body: &str) -> String {
        format!("{}{}", TRIANGLE, body)
    }

    #[test]
    fn test_vertex_axis_conversion() {
        let model = parse_xplane_obj("VT 1 2 3 0 0 1 0.5 0.5").unwrap();
        let vertex = model.geometry.vertices()[0];

        assert_eq!(vertex.position, Vec3::new(1.0, -3.0, 2.0));
        assert_eq!(vertex.normal, Vec3::new(0.0, -1.0, 0.0));
        assert_eq!(vertex.uv, [0.5, 0.5]);
    }

    #[test]
    fn test_loose_mesh() {
        let model = parse_xplane_obj(&with_triangle("TRIS 0 3\n")).unwrap();

        assert_eq!(model.loose.len(), 1);
        assert_eq!(model.loose[0].label, "OBJ0");
        assert_eq!(model.loose[0].faces, vec![[0, 1, 2]]);
        assert!(model.roots.is_empty());
        assert!(model.warnings.is_empty());
    }

    #[test]
    fn test_idx10_and_texture() {
        let text = "TEXTURE panel.png\nIDX10 0 1 2 3 4 5 6 7 8 9\n";
        let model = parse_xplane_obj(text).unwrap();

        assert_eq!(model.texture.as_deref(), Some("panel.png"));
        assert_eq!(model.geometry.index_count(), 10);
    }

    #[test]
    fn test_debug_labels_name_blocks_and_meshes() {
        let text = with_triangle(
            r#"
# left aileron
ANIM_begin
ANIM_rotate 1 0 0 -20 20 -1 1 sim/ail
# aileron skin
TRIS 0 3
ANIM_end
ANIM_begin
ANIM_rotate 1 0 0 -20 20 -1 1 sim/ail
TRIS 0 3
ANIM_end
"#,
        );
        let model = parse_xplane_obj(&text).unwrap();

        assert_eq!(model.block_labels(), vec!["left_aileron", "ARM0"]);
        assert_eq!(model.block(BlockId(0)).meshes[0].label, "aileron_skin");
        assert_eq!(model.block(BlockId(1)).meshes[0].label, "OBJ1");
    }

    #[test]
    fn test_nested_blocks_link_parent() {
        let text = with_triangle(
            r#"
ANIM_begin
ANIM_rotate 0 1 0 0 90 0 1 sim/outer
ANIM_begin
ANIM_trans 0 0 0 0 0 1 0 1 sim/inner
TRIS 0 3
ANIM_end
ANIM_end
"#,
        );
        let model = parse_xplane_obj(&text).unwrap();

        assert_eq!(model.roots, vec![BlockId(0)]);
        let outer = model.block(BlockId(0));
        let inner = model.block(BlockId(1));
        assert_eq!(outer.children, vec![BlockId(1)]);
        assert_eq!(inner.parent, Some(BlockId(0)));
        assert_eq!(outer.keyframes.len(), 2);
        assert_eq!(inner.keyframes.len(), 2);
        assert_eq!(inner.meshes.len(), 1);
    }

    #[test]
    fn test_contentless_nested_block_merges_events() {
        let text = with_triangle(
            r#"
ANIM_begin
ANIM_rotate 0 1 0 0 90 0 1 sim/a
ANIM_begin
ANIM_hide 0 1 sim/b
ANIM_end
TRIS 0 3
ANIM_end
"#,
        );
        let model = parse_xplane_obj(&text).unwrap();

        let outer = model.block(BlockId(0));
        assert!(outer.children.is_empty());
        assert_eq!(outer.keyframes.len(), 3);
        assert!(matches!(
            outer.keyframes[2],
            KeyframeEvent::Visibility {
                kind: VisibilityKind::Hide,
                ..
            }
        ));
        assert_eq!(model.block_labels(), vec!["ARM0"]);
    }

    #[test]
    fn test_empty_blocks_are_dropped() {
        let text = with_triangle("ANIM_begin\nANIM_begin\nANIM_end\nANIM_end\nTRIS 0 3\n");
        let model = parse_xplane_obj(&text).unwrap();

        assert!(model.roots.is_empty());
        assert_eq!(model.loose.len(), 1);
    }

    #[test]
    fn test_unbalanced_end_is_a_warning() {
        let model = parse_xplane_obj(&with_triangle("ANIM_end\nTRIS 0 3\n")).unwrap();

        assert_eq!(model.loose.len(), 1);
        assert!(matches!(
            model.warnings[0],
            ImportWarning::UnbalancedBlockMarker { line: 12 }
        ));
    }

    #[test]
    fn test_unclosed_block_is_closed_with_warning() {
        let text = with_triangle("ANIM_begin\nANIM_rotate 1 0 0 0 45 0 1 sim/a\nTRIS 0 3\n");
        let model = parse_xplane_obj(&text).unwrap();

        assert_eq!(model.roots, vec![BlockId(0)]);
        assert!(matches!(
            &model.warnings[0],
            ImportWarning::UnclosedBlock { label, .. } if label == "ARM0"
        ));
    }

    #[test]
    fn test_trans_and_rotate_events() {
        let text = with_triangle(
            r#"
ANIM_begin
ANIM_trans 1 2 3 1 2 3 0 0 none
ANIM_rotate 0 1 0 -45 45 0 1
TRIS 0 3
ANIM_end
"#,
        );
        let model = parse_xplane_obj(&text).unwrap();
        let events = &model.block(BlockId(0)).keyframes;

        assert_eq!(events.len(), 4);
        match &events[0] {
            KeyframeEvent::Translate {
                position, dataref, ..
            } => {
                assert_eq!(*position, Vec3::new(1.0, -3.0, 2.0));
                assert_eq!(dataref, "none");
            }
            other => panic!("Expected translate, got {:?}", other),
        }
        match &events[3] {
            KeyframeEvent::Rotate {
                axis,
                angle_degrees,
                value,
                dataref,
            } => {
                // ANIM_rotate swaps Y and Z without negating
                assert_eq!(*axis, Vec3::new(0.0, 0.0, 1.0));
                assert_eq!(*angle_degrees, 45.0);
                assert_eq!(*value, 1.0);
                assert_eq!(dataref, DISABLED_DATAREF);
            }
            other => panic!("Expected rotate, got {:?}", other),
        }
    }

    #[test]
    fn test_keyed_animation() {
        let text = with_triangle(
            r#"
ANIM_begin
ANIM_trans_begin sim/flap
ANIM_trans_key 0 0 0 0
ANIM_trans_key 0.5 0 0 1
ANIM_trans_key 1 0 0 2
ANIM_trans_end
ANIM_rotate_begin 0 0 1 sim/flap
ANIM_rotate_key 0 0
ANIM_rotate_key 1 30
ANIM_rotate_end
TRIS 0 3
ANIM_end
"#,
        );
        let model = parse_xplane_obj(&text).unwrap();
        let events = &model.block(BlockId(0)).keyframes;

        assert_eq!(events.len(), 5);
        assert!(events.iter().all(|e| e.dataref() == "sim/flap"));
        match &events[2] {
            KeyframeEvent::Translate {
                position, value, ..
            } => {
                assert_eq!(*position, Vec3::new(0.0, -2.0, 0.0));
                assert_eq!(*value, 1.0);
            }
            other => panic!("Expected translate, got {:?}", other),
        }
        match &events[4] {
            KeyframeEvent::Rotate {
                axis,
                angle_degrees,
                ..
            } => {
                // ANIM_rotate_begin uses the full point conversion
                assert_eq!(*axis, Vec3::new(0.0, -1.0, 0.0));
                assert_eq!(*angle_degrees, 30.0);
            }
            other => panic!("Expected rotate, got {:?}", other),
        }
    }

    #[test]
    fn test_key_without_begin_is_malformed() {
        let err = parse_xplane_obj("ANIM_begin\nANIM_rotate_key 0 10\n").unwrap_err();
        assert!(matches!(
            err,
            ParseError::MalformedInstruction { line: 2, .. }
        ));

        let text = "ANIM_begin\nANIM_trans_begin sim/a\nANIM_trans_end\nANIM_trans_key 0 0 0 0\n";
        assert!(parse_xplane_obj(text).is_err());
    }

    #[test]
    fn test_events_outside_blocks_attach_to_next_loose_mesh() {
        let text = with_triangle("ANIM_hide 0 1 sim/a\nTRIS 0 3\nTRIS 0 3\nANIM_show 0 1 sim/b\n");
        let model = parse_xplane_obj(&text).unwrap();

        assert_eq!(model.loose[0].keyframes.len(), 1);
        assert!(model.loose[1].keyframes.is_empty());
        assert!(matches!(
            model.warnings[0],
            ImportWarning::DiscardedKeyframes { count: 1 }
        ));
    }

    #[test]
    fn test_attributes_persist_and_replace() {
        let text = with_triangle(
            r#"
ATTR_shiny_rat 0.5
ATTR_hard concrete
TRIS 0 3
ATTR_shiny_rat 1.0
TRIS 0 3
ATTR_reset
TRIS 0 3
"#,
        );
        let model = parse_xplane_obj(&text).unwrap();

        assert_eq!(
            model.loose[0].attributes,
            vec![
                ("ATTR_shiny_rat".to_string(), "0.5".to_string()),
                ("ATTR_hard".to_string(), "concrete".to_string()),
            ]
        );
        assert_eq!(model.loose[1].attributes[0].1, "1.0");
        assert!(model.loose[2].attributes.is_empty());
    }

    #[test]
    fn test_tris_count_must_be_multiple_of_three() {
        let err = parse_xplane_obj(&with_triangle("TRIS 0 2\n")).unwrap_err();
        match err {
            ParseError::MalformedInstruction { keyword, .. } => assert_eq!(keyword, "TRIS"),
            other => panic!("Expected MalformedInstruction, got {:?}", other),
        }
    }

    #[test]
    fn test_tris_out_of_range() {
        let err = parse_xplane_obj(&with_triangle("TRIS 3 3\n")).unwrap_err();
        assert!(matches!(
            err,
            ParseError::IndexOutOfRange {
                source: GeometryError::RangeError { .. },
                ..
            }
        ));

        let err = parse_xplane_obj("VT 0 0 0 0 1 0 0 0\nIDX 0\nIDX 1\nIDX 0\nTRIS 0 3\n")
            .unwrap_err();
        assert!(matches!(
            err,
            ParseError::IndexOutOfRange {
                line: 5,
                source: GeometryError::VertexIndex { index: 1, .. },
                ..
            }
        ));
    }

    #[test]
    fn test_short_lines_are_malformed() {
        for text in [
            "VT 1 2 3",
            "ANIM_trans 1 2 3 4 5",
            "ANIM_trans 1 2 3 4 5 6 0 1",
            "ANIM_rotate 1 0 0 0 90 0",
            "ANIM_hide 0 1",
            "TRIS 0",
            "TEXTURE",
        ] {
            match parse_xplane_obj(text) {
                Err(ParseError::MalformedInstruction { line: 1, .. }) => {}
                other => panic!("{:?} should be malformed, got {:?}", text, other),
            }
        }
    }

    #[test]
    fn test_bad_number_is_fatal() {
        let err = parse_xplane_obj("VT 1 2 zero 0 1 0 0 0").unwrap_err();
        assert!(matches!(
            err,
            ParseError::NumericConversion { line: 1, field: 3, .. }
        ));
        assert!(err.to_string().contains("VT"));
    }

    #[test]
    fn test_point_counts_mismatch() {
        let text = format!("POINT_COUNTS 4 0 0 3\n{}", TRIANGLE);
        let model = parse_xplane_obj(&text).unwrap();

        assert_eq!(model.warnings.len(), 1);
        assert!(matches!(
            model.warnings[0],
            ImportWarning::PointCountMismatch {
                what: "vertices",
                declared: 4,
                found: 3
            }
        ));
    }

    #[test]
    fn test_unknown_keywords_ignored() {
        let text = with_triangle("ATTR_LOD 0 1000\nLIGHTS 0 0\nSMOKE_BLACK 0 0 0 1\nTRIS 0 3\n");
        let model = parse_xplane_obj(&text).unwrap();
        assert_eq!(model.loose.len(), 1);
    }

    #[test]
    fn test_block_state() {
        let mut state = ParserState::new();
        assert_eq!(state.state(), BlockState::Idle);

        for raw in ["ANIM_begin", "ANIM_begin"] {
            state.feed(&Line::parse(1, raw).unwrap()).unwrap();
        }
        assert_eq!(state.state(), BlockState::InBlock(2));

        state.feed(&Line::parse(3, "ANIM_end").unwrap()).unwrap();
        assert_eq!(state.state(), BlockState::InBlock(1));
    }
}
