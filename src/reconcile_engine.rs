//! Move rewriting and subsumed-item filtering for one cycle
use crate::batch::EditBatch;
use crate::config::{MoveRewriteGate, ReconcilerConfig};
use crate::types::{ItemChangeSet, ItemMove, SectionChangeSet};
use log::debug;

/// Where a recorded move ends up after section-level changes are considered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MoveResolution {
    /// Source section is gone, the row only reappears at the target.
    InsertAtTarget,
    /// Target section is new and supplies the row, only the source goes away.
    DeleteAtSource,
    Keep,
}

pub struct ReconcileEngine<'a> {
    sections: &'a SectionChangeSet,
    items: &'a mut ItemChangeSet,
    config: &'a ReconcilerConfig,
}

impl<'a> ReconcileEngine<'a> {
    pub fn new(
        sections: &'a SectionChangeSet,
        items: &'a mut ItemChangeSet,
        config: &'a ReconcilerConfig,
    ) -> Self {
        ReconcileEngine { sections, items, config }
    }

    /// Rewrite, filter and emit. Leaves `items` drained.
    pub fn reconcile(mut self) -> EditBatch {
        if self.should_rewrite_moves() {
            self.rewrite_moves();
        }
        if self.config.filter_subsumed_items {
            self.drop_subsumed_items();
        }
        self.into_batch()
    }

    fn should_rewrite_moves(&self) -> bool {
        if self.items.moved.is_empty() {
            return false;
        }
        let inserted = !self.sections.inserted.is_empty();
        let deleted = !self.sections.deleted.is_empty();
        match self.config.move_rewrite {
            MoveRewriteGate::EitherSectionSet => inserted || deleted,
            MoveRewriteGate::BothSectionSets => inserted && deleted,
        }
    }

    fn resolve_move(&self, item_move: &ItemMove) -> MoveResolution {
        let source_deleted = self.sections.is_deleted(item_move.from.section);
        let target_inserted = self.sections.is_inserted(item_move.to.section);
        match (source_deleted, target_inserted) {
            (true, false) => MoveResolution::InsertAtTarget,
            (false, true) => MoveResolution::DeleteAtSource,
            _ => MoveResolution::Keep,
        }
    }

    fn rewrite_moves(&mut self) {
        let moves = std::mem::take(&mut self.items.moved);
        let mut kept = Vec::with_capacity(moves.len());

        for item_move in moves {
            match self.resolve_move(&item_move) {
                MoveResolution::InsertAtTarget => {
                    debug!(
                        "ReconcileEngine: move {} -> {} leaves a deleted section, rewritten as insert",
                        item_move.from, item_move.to
                    );
                    self.items.inserted.push(item_move.to);
                }
                MoveResolution::DeleteAtSource => {
                    debug!(
                        "ReconcileEngine: move {} -> {} enters an inserted section, rewritten as delete",
                        item_move.from, item_move.to
                    );
                    self.items.deleted.push(item_move.from);
                }
                MoveResolution::Keep => kept.push(item_move),
            }
        }

        self.items.moved = kept;
    }

    fn drop_subsumed_items(&mut self) {
        let sections = self.sections;

        let before = self.items.deleted.len();
        self.items.deleted.retain(|path| !sections.is_deleted(path.section));
        let dropped_deletes = before - self.items.deleted.len();

        let before = self.items.inserted.len();
        self.items.inserted.retain(|path| !sections.is_inserted(path.section));
        let dropped_inserts = before - self.items.inserted.len();

        if dropped_deletes > 0 || dropped_inserts > 0 {
            debug!(
                "ReconcileEngine: dropped {} item deletes and {} item inserts covered by section changes",
                dropped_deletes, dropped_inserts
            );
        }
    }

    fn into_batch(self) -> EditBatch {
        EditBatch {
            deleted_sections: self.sections.deleted.clone(),
            inserted_sections: self.sections.inserted.clone(),
            deleted_items: std::mem::take(&mut self.items.deleted),
            inserted_items: std::mem::take(&mut self.items.inserted),
            reloaded_items: std::mem::take(&mut self.items.updated),
            moves: std::mem::take(&mut self.items.moved),
        }
    }
}
