//! Pairs a reconciler with the list it drives and maps observer callbacks
use crate::batch::{CommitResult, EditBatch};
use crate::errors::{ReconcilerError, RenderError};
use crate::reconciler::ChangeSetReconciler;
use crate::types::{ChangeKind, IndexPath};
use log::{debug, info, warn};

/// The list or grid that receives committed batches.
pub trait ListRenderer {
    /// Whether the container is currently part of a visible hierarchy.
    fn is_attached(&self) -> bool;

    /// Whether at least one row is currently bound to a visible cell.
    fn has_visible_rows(&self) -> bool;

    /// Apply the whole batch as one transaction, or nothing of it.
    fn apply_batch(&mut self, batch: &EditBatch) -> Result<(), RenderError>;

    fn reload_all(&mut self);
}

/// Callbacks of a data-observation feed, one cycle at a time.
pub trait ChangeObserver {
    type Outcome;

    fn on_cycle_will_change(&mut self);

    fn on_object_changed(
        &mut self,
        kind: ChangeKind,
        source: Option<IndexPath>,
        target: Option<IndexPath>,
    ) -> Result<(), ReconcilerError>;

    fn on_section_changed(&mut self, index: usize, kind: ChangeKind) -> Result<(), ReconcilerError>;

    fn on_cycle_did_change(&mut self) -> Self::Outcome;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReloadReason {
    /// The container was not attached when the cycle ended.
    Detached,
    /// The renderer refused the batch.
    Rejected(RenderError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The batch went through. `structural` is false for reload-only batches.
    Applied { structural: bool },
    /// Nothing left to apply after reconciliation.
    Skipped,
    Reloaded(ReloadReason),
}

pub struct CollectionUpdater<R: ListRenderer> {
    reconciler: ChangeSetReconciler,
    renderer: R,
}

impl<R: ListRenderer> CollectionUpdater<R> {
    pub fn new(renderer: R) -> Self {
        Self::with_reconciler(ChangeSetReconciler::new(), renderer)
    }

    pub fn with_reconciler(reconciler: ChangeSetReconciler, renderer: R) -> Self {
        CollectionUpdater { reconciler, renderer }
    }

    pub fn reconciler(&self) -> &ChangeSetReconciler {
        &self.reconciler
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn into_renderer(self) -> R {
        self.renderer
    }

    fn apply(&mut self, batch: EditBatch) -> ApplyOutcome {
        let batch = if self.renderer.has_visible_rows() {
            batch
        } else {
            if !batch.reloaded_items.is_empty() {
                debug!(
                    "CollectionUpdater: no visible rows, skipping {} reloads",
                    batch.reloaded_items.len()
                );
            }
            batch.without_reloads()
        };

        if batch.is_empty() {
            return ApplyOutcome::Skipped;
        }

        let structural = batch.has_structural_changes();
        match self.renderer.apply_batch(&batch) {
            Ok(()) => ApplyOutcome::Applied { structural },
            Err(err) => {
                warn!("CollectionUpdater: batch rejected ({}), falling back to full reload", err);
                self.renderer.reload_all();
                ApplyOutcome::Reloaded(ReloadReason::Rejected(err))
            }
        }
    }
}

impl<R: ListRenderer> ChangeObserver for CollectionUpdater<R> {
    type Outcome = ApplyOutcome;

    fn on_cycle_will_change(&mut self) {
        self.reconciler.begin_cycle();
    }

    fn on_object_changed(
        &mut self,
        kind: ChangeKind,
        source: Option<IndexPath>,
        target: Option<IndexPath>,
    ) -> Result<(), ReconcilerError> {
        self.reconciler.record_item_change(kind, source, target)
    }

    fn on_section_changed(&mut self, index: usize, kind: ChangeKind) -> Result<(), ReconcilerError> {
        self.reconciler.record_section_change(index, kind)
    }

    fn on_cycle_did_change(&mut self) -> ApplyOutcome {
        match self.reconciler.commit(self.renderer.is_attached()) {
            CommitResult::Reload => {
                info!("CollectionUpdater: container detached, reloading all");
                self.renderer.reload_all();
                ApplyOutcome::Reloaded(ReloadReason::Detached)
            }
            CommitResult::Batch(batch) => self.apply(batch),
        }
    }
}
