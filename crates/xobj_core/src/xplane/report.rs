//! Outcome of an import: counts plus non-fatal warnings.

use thiserror::Error;

use super::sink::SinkError;

/// A recoverable problem. The import carried on past it.
#[derive(Error, Debug)]
pub enum ImportWarning {
    #[error("line {line}: ANIM_end without a matching ANIM_begin")]
    UnbalancedBlockMarker { line: usize },

    #[error("block `{label}` opened at line {line} was never closed")]
    UnclosedBlock { label: String, line: usize },

    #[error("{count} keyframe(s) after the last object were discarded")]
    DiscardedKeyframes { count: usize },

    #[error("POINT_COUNTS declared {declared} {what}, found {found}")]
    PointCountMismatch {
        what: &'static str,
        declared: usize,
        found: usize,
    },

    #[error("`{node}`: {source}")]
    Collaborator {
        node: String,
        #[source]
        source: SinkError,
    },
}

/// Summary returned by a successful import.
#[derive(Debug, Default)]
pub struct ImportReport {
    /// Top-level objects: loose meshes plus joints without a parent joint
    pub object_count: usize,

    /// Joints created
    pub joint_count: usize,

    /// Meshes created, loose or parented
    pub mesh_count: usize,

    /// Keyframe samples written
    pub keyframe_count: usize,

    pub warnings: Vec<ImportWarning>,
}

impl ImportReport {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Record a warning and log it.
    pub(crate) fn warn(&mut self, warning: ImportWarning) {
        log::warn!("{}", warning);
        self.warnings.push(warning);
    }
}
