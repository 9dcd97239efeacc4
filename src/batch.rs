//! The commit batch handed to the rendering collaborator
use crate::errors::ReconcilerError;
use crate::types::{IndexPath, ItemMove};
use indexmap::IndexSet;
use serde::Serialize;

/// One atomic step of a batch, in the order the container must apply it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "targets", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EditStep {
    DeleteSections(Vec<usize>),
    InsertSections(Vec<usize>),
    DeleteItems(Vec<IndexPath>),
    InsertItems(Vec<IndexPath>),
    ReloadItems(Vec<IndexPath>),
}

/// Reconciled structural edits of one cycle.
///
/// Section deletions and item deletions/reloads address positions before the
/// batch is applied; insertions address positions after it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EditBatch {
    pub deleted_sections: IndexSet<usize>,
    pub inserted_sections: IndexSet<usize>,
    pub deleted_items: Vec<IndexPath>,
    pub inserted_items: Vec<IndexPath>,
    pub reloaded_items: Vec<IndexPath>,
    pub moves: Vec<ItemMove>,
}

impl EditBatch {
    pub fn is_empty(&self) -> bool {
        self.deleted_sections.is_empty()
            && self.inserted_sections.is_empty()
            && self.deleted_items.is_empty()
            && self.inserted_items.is_empty()
            && self.reloaded_items.is_empty()
            && self.moves.is_empty()
    }

    /// True when anything is inserted, deleted or moved, that is, whenever the
    /// container's shape changes rather than only its content.
    pub fn has_structural_changes(&self) -> bool {
        !(self.deleted_sections.is_empty()
            && self.inserted_sections.is_empty()
            && self.deleted_items.is_empty()
            && self.inserted_items.is_empty()
            && self.moves.is_empty())
    }

    /// Drop the in-place reloads, used when no row is currently bound.
    pub fn without_reloads(mut self) -> Self {
        self.reloaded_items.clear();
        self
    }

    /// Flatten into the fixed application order. Empty groups produce no
    /// step and every move becomes a delete at its source followed by an
    /// insert at its target.
    pub fn steps(&self) -> Vec<EditStep> {
        let mut steps = Vec::with_capacity(5 + self.moves.len() * 2);

        if !self.deleted_sections.is_empty() {
            steps.push(EditStep::DeleteSections(self.deleted_sections.iter().copied().collect()));
        }
        if !self.inserted_sections.is_empty() {
            steps.push(EditStep::InsertSections(self.inserted_sections.iter().copied().collect()));
        }
        if !self.deleted_items.is_empty() {
            steps.push(EditStep::DeleteItems(self.deleted_items.clone()));
        }
        if !self.inserted_items.is_empty() {
            steps.push(EditStep::InsertItems(self.inserted_items.clone()));
        }
        if !self.reloaded_items.is_empty() {
            steps.push(EditStep::ReloadItems(self.reloaded_items.clone()));
        }
        for item_move in &self.moves {
            steps.push(EditStep::DeleteItems(vec![item_move.from]));
            steps.push(EditStep::InsertItems(vec![item_move.to]));
        }

        steps
    }

    pub fn to_json(&self) -> Result<serde_json::Value, ReconcilerError> {
        let mut value = serde_json::to_value(self)?;
        if let Some(map) = value.as_object_mut() {
            map.insert("steps".to_string(), serde_json::to_value(self.steps())?);
        }
        Ok(value)
    }
}

/// What `commit` asks the caller to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitResult {
    /// Apply this batch as one transaction.
    Batch(EditBatch),
    /// Discard all model state and reload the whole container.
    Reload,
}

impl CommitResult {
    pub fn is_reload(&self) -> bool {
        matches!(self, CommitResult::Reload)
    }

    pub fn batch(&self) -> Option<&EditBatch> {
        match self {
            CommitResult::Batch(batch) => Some(batch),
            CommitResult::Reload => None,
        }
    }

    pub fn into_batch(self) -> Option<EditBatch> {
        match self {
            CommitResult::Batch(batch) => Some(batch),
            CommitResult::Reload => None,
        }
    }
}
