//! Per-cycle change accumulation with an explicit begin/commit lifecycle
use crate::batch::CommitResult;
use crate::config::ReconcilerConfig;
use crate::errors::ReconcilerError;
use crate::reconcile_engine::ReconcileEngine;
use crate::types::{
    next_cycle_id, ChangeKind, ChangeSummary, CycleId, IndexPath, ItemChange, ItemChangeSet,
    SectionChangeSet,
};
use log::{debug, info, warn};

/// Accumulates one notification cycle of section and item changes and turns
/// it into a single commit batch.
///
/// Every `record_*` call must happen between [`begin_cycle`](Self::begin_cycle)
/// and [`commit`](Self::commit). The state is exclusively owned by the open
/// cycle; starting a new cycle silently drops whatever was not committed.
#[derive(Debug, Default)]
pub struct ChangeSetReconciler {
    config: ReconcilerConfig,
    sections: SectionChangeSet,
    items: ItemChangeSet,
    cycle: Option<CycleId>,
}

impl ChangeSetReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ReconcilerConfig) -> Self {
        ChangeSetReconciler {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    pub fn begin_cycle(&mut self) {
        if !self.is_empty() {
            warn!(
                "ChangeSetReconciler: discarding uncommitted changes of {} ({})",
                self.cycle.map(|id| id.to_string()).unwrap_or_else(|| "closed cycle".to_string()),
                self.summary()
            );
        }
        self.clear();
        let id = next_cycle_id();
        self.cycle = Some(id);
        debug!("ChangeSetReconciler: {} started", id);
    }

    pub fn record_section_change(&mut self, index: usize, kind: ChangeKind) -> Result<(), ReconcilerError> {
        let cycle = self.open_cycle()?;
        let added = self.sections.record(index, kind)?;
        debug!(
            "ChangeSetReconciler: {} section {} {}{}",
            cycle,
            index,
            kind,
            if added { "" } else { " (already recorded)" }
        );
        Ok(())
    }

    pub fn record_item_change(
        &mut self,
        kind: ChangeKind,
        source: Option<IndexPath>,
        target: Option<IndexPath>,
    ) -> Result<(), ReconcilerError> {
        let cycle = self.open_cycle()?;
        let change = ItemChange::from_parts(kind, source, target)?;
        debug!("ChangeSetReconciler: {} item {:?}", cycle, change);
        self.items.push(change);
        Ok(())
    }

    /// Close the cycle. A detached container gets [`CommitResult::Reload`]
    /// and no diff is computed; otherwise the reconciled batch is returned.
    /// Either way the state is empty afterwards.
    pub fn commit(&mut self, is_container_attached: bool) -> CommitResult {
        let label = self
            .cycle
            .take()
            .map(|id| id.to_string())
            .unwrap_or_else(|| "closed cycle".to_string());

        if !is_container_attached {
            info!(
                "ChangeSetReconciler: {} committed to a detached container, full reload ({})",
                label,
                self.summary()
            );
            self.clear();
            return CommitResult::Reload;
        }

        let batch = ReconcileEngine::new(&self.sections, &mut self.items, &self.config).reconcile();
        self.clear();

        debug!(
            "ChangeSetReconciler: {} committed {} steps ({} moves)",
            label,
            batch.steps().len(),
            batch.moves.len()
        );
        CommitResult::Batch(batch)
    }

    /// Abandon the open cycle without producing a batch.
    pub fn discard(&mut self) {
        if let Some(id) = self.cycle.take() {
            debug!("ChangeSetReconciler: {} discarded ({})", id, self.summary());
        }
        self.clear();
    }

    pub fn is_cycle_open(&self) -> bool {
        self.cycle.is_some()
    }

    pub fn cycle_id(&self) -> Option<CycleId> {
        self.cycle
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty() && self.items.is_empty()
    }

    pub fn summary(&self) -> ChangeSummary {
        ChangeSummary::of(&self.sections, &self.items)
    }

    pub fn sections(&self) -> &SectionChangeSet {
        &self.sections
    }

    pub fn items(&self) -> &ItemChangeSet {
        &self.items
    }

    fn open_cycle(&self) -> Result<CycleId, ReconcilerError> {
        self.cycle.ok_or(ReconcilerError::NoOpenCycle)
    }

    fn clear(&mut self) {
        self.sections.clear();
        self.items.clear();
    }
}
