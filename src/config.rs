//! Reconciler settings, loadable from JSON
use crate::errors::ReconcilerError;
use serde::{Deserialize, Serialize};

/// When cross-section move rewriting runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveRewriteGate {
    /// Whenever at least one section-level set is non-empty; each move is
    /// then matched on its own source and target side.
    #[default]
    EitherSectionSet,
    /// Only when both the inserted and the deleted section sets are non-empty.
    BothSectionSets,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReconcilerConfig {
    pub move_rewrite: MoveRewriteGate,
    /// Drop item inserts/deletes already covered by a section insert/delete.
    /// Turning this off lets the batch carry edits inside changed sections.
    pub filter_subsumed_items: bool,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        ReconcilerConfig {
            move_rewrite: MoveRewriteGate::default(),
            filter_subsumed_items: true,
        }
    }
}

impl ReconcilerConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ReconcilerError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_move_rewrite(mut self, gate: MoveRewriteGate) -> Self {
        self.move_rewrite = gate;
        self
    }

    pub fn with_filter_subsumed_items(mut self, enabled: bool) -> Self {
        self.filter_subsumed_items = enabled;
        self
    }
}
