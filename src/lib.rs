//! Batched update reconciler for sectioned lists and grids.
//!
//! A data-observation feed reports one cycle of fine-grained changes
//! (section insert/delete, item insert/delete/update/move). The
//! [`ChangeSetReconciler`] collects them, rewrites moves that cross into or
//! out of inserted/deleted sections, drops item edits already covered by a
//! section edit, and commits a single [`EditBatch`] for the container to
//! apply in one transaction. [`CollectionUpdater`] wires the feed callbacks
//! to a [`ListRenderer`] and falls back to a full reload whenever the
//! container is detached or refuses the batch.
//!
//! ```
//! use collection_reconciler::{ChangeKind, ChangeSetReconciler, IndexPath};
//!
//! let mut reconciler = ChangeSetReconciler::new();
//! reconciler.begin_cycle();
//! reconciler.record_section_change(1, ChangeKind::Delete).unwrap();
//! reconciler
//!     .record_item_change(ChangeKind::Move, Some(IndexPath::new(1, 0)), Some(IndexPath::new(2, 0)))
//!     .unwrap();
//!
//! let batch = reconciler.commit(true).into_batch().unwrap();
//! assert_eq!(batch.inserted_items, vec![IndexPath::new(2, 0)]);
//! assert!(batch.moves.is_empty());
//! ```
mod batch;
mod config;
mod errors;
mod reconcile_engine;
mod reconciler;
mod types;
mod updater;

#[cfg(feature = "python")]
mod python;

pub use batch::{CommitResult, EditBatch, EditStep};
pub use config::{MoveRewriteGate, ReconcilerConfig};
pub use errors::{PositionRole, ReconcilerError, RenderError};
pub use reconcile_engine::ReconcileEngine;
pub use reconciler::ChangeSetReconciler;
pub use types::{
    next_cycle_id, ChangeKind, ChangeSummary, CycleId, IndexPath, ItemChange, ItemChangeSet, ItemMove,
    SectionChangeSet,
};
pub use updater::{ApplyOutcome, ChangeObserver, CollectionUpdater, ListRenderer, ReloadReason};
