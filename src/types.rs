//! Change kinds, positions and the per-cycle change sets
use crate::errors::{PositionRole, ReconcilerError};
use indexmap::IndexSet;
use once_cell::sync::Lazy;
use phf::phf_map;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

/// Kind of a single change notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Insert,
    Delete,
    Update,
    Move,
}

// Compile-time name lookup, keys are lowercase
static CHANGE_KIND_NAMES: phf::Map<&'static str, ChangeKind> = phf_map! {
    "insert" => ChangeKind::Insert,
    "delete" => ChangeKind::Delete,
    "remove" => ChangeKind::Delete,
    "update" => ChangeKind::Update,
    "reload" => ChangeKind::Update,
    "move" => ChangeKind::Move,
};

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Insert => "INSERT",
            ChangeKind::Delete => "DELETE",
            ChangeKind::Update => "UPDATE",
            ChangeKind::Move => "MOVE",
        }
    }

    /// Map the raw codes used by persistence change feeds
    /// (insert = 1, delete = 2, move = 3, update = 4).
    pub fn from_raw(code: u64) -> Result<Self, ReconcilerError> {
        match code {
            1 => Ok(ChangeKind::Insert),
            2 => Ok(ChangeKind::Delete),
            3 => Ok(ChangeKind::Move),
            4 => Ok(ChangeKind::Update),
            other => Err(ReconcilerError::UnknownChangeKind(format!("raw code {}", other))),
        }
    }

    pub fn raw(&self) -> u64 {
        match self {
            ChangeKind::Insert => 1,
            ChangeKind::Delete => 2,
            ChangeKind::Move => 3,
            ChangeKind::Update => 4,
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChangeKind {
    type Err = ReconcilerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CHANGE_KIND_NAMES
            .get(s.trim().to_ascii_lowercase().as_str())
            .copied()
            .ok_or_else(|| ReconcilerError::UnknownChangeKind(s.to_string()))
    }
}

/// A (section, row) position in a sectioned list or grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IndexPath {
    pub section: usize,
    pub row: usize,
}

impl IndexPath {
    pub const fn new(section: usize, row: usize) -> Self {
        IndexPath { section, row }
    }
}

impl From<(usize, usize)> for IndexPath {
    fn from((section, row): (usize, usize)) -> Self {
        IndexPath { section, row }
    }
}

impl fmt::Display for IndexPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.section, self.row)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemMove {
    pub from: IndexPath,
    pub to: IndexPath,
}

/// One item-level change, validated when it is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemChange {
    Insert { to: IndexPath },
    Delete { from: IndexPath },
    Update { at: IndexPath },
    Move { from: IndexPath, to: IndexPath },
}

impl ItemChange {
    /// Resolve a raw `(kind, source, target)` notification. Insert takes only
    /// a target, Delete and Update only a source, Move both.
    pub fn from_parts(
        kind: ChangeKind,
        source: Option<IndexPath>,
        target: Option<IndexPath>,
    ) -> Result<Self, ReconcilerError> {
        let missing = |role: PositionRole| ReconcilerError::MissingPosition { kind, role };
        let unexpected = |role: PositionRole, position: IndexPath| ReconcilerError::UnexpectedPosition { kind, role, position };

        match kind {
            ChangeKind::Insert => {
                if let Some(position) = source {
                    return Err(unexpected(PositionRole::Source, position));
                }
                let to = target.ok_or_else(|| missing(PositionRole::Target))?;
                Ok(ItemChange::Insert { to })
            }
            ChangeKind::Delete | ChangeKind::Update => {
                if let Some(position) = target {
                    return Err(unexpected(PositionRole::Target, position));
                }
                let from = source.ok_or_else(|| missing(PositionRole::Source))?;
                if kind == ChangeKind::Delete {
                    Ok(ItemChange::Delete { from })
                } else {
                    Ok(ItemChange::Update { at: from })
                }
            }
            ChangeKind::Move => {
                let from = source.ok_or_else(|| missing(PositionRole::Source))?;
                let to = target.ok_or_else(|| missing(PositionRole::Target))?;
                Ok(ItemChange::Move { from, to })
            }
        }
    }

    pub fn kind(&self) -> ChangeKind {
        match self {
            ItemChange::Insert { .. } => ChangeKind::Insert,
            ItemChange::Delete { .. } => ChangeKind::Delete,
            ItemChange::Update { .. } => ChangeKind::Update,
            ItemChange::Move { .. } => ChangeKind::Move,
        }
    }
}

/// Section indices inserted or deleted during one cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionChangeSet {
    pub(crate) inserted: IndexSet<usize>,
    pub(crate) deleted: IndexSet<usize>,
}

impl SectionChangeSet {
    /// Returns `true` when the index was not already recorded under `kind`.
    pub fn record(&mut self, index: usize, kind: ChangeKind) -> Result<bool, ReconcilerError> {
        if !matches!(kind, ChangeKind::Insert | ChangeKind::Delete) {
            return Err(ReconcilerError::UnsupportedSectionChange(kind));
        }
        if let Some(existing) = self.kind_of(index).filter(|existing| *existing != kind) {
            return Err(ReconcilerError::ConflictingSectionChange {
                index,
                existing,
                requested: kind,
            });
        }
        let target = if kind == ChangeKind::Insert { &mut self.inserted } else { &mut self.deleted };
        Ok(target.insert(index))
    }

    pub fn inserted(&self) -> &IndexSet<usize> {
        &self.inserted
    }

    pub fn deleted(&self) -> &IndexSet<usize> {
        &self.deleted
    }

    pub fn is_inserted(&self, section: usize) -> bool {
        self.inserted.contains(&section)
    }

    pub fn is_deleted(&self, section: usize) -> bool {
        self.deleted.contains(&section)
    }

    pub fn kind_of(&self, section: usize) -> Option<ChangeKind> {
        if self.is_inserted(section) {
            Some(ChangeKind::Insert)
        } else if self.is_deleted(section) {
            Some(ChangeKind::Delete)
        } else {
            None
        }
    }

    pub fn is_empty(&self) -> bool {
        self.inserted.is_empty() && self.deleted.is_empty()
    }

    pub fn clear(&mut self) {
        self.inserted.clear();
        self.deleted.clear();
    }
}

/// Item-level changes of one cycle, each kind kept in recorded order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemChangeSet {
    pub(crate) inserted: Vec<IndexPath>,
    pub(crate) deleted: Vec<IndexPath>,
    pub(crate) updated: Vec<IndexPath>,
    pub(crate) moved: Vec<ItemMove>,
}

impl ItemChangeSet {
    pub fn push(&mut self, change: ItemChange) {
        match change {
            ItemChange::Insert { to } => self.inserted.push(to),
            ItemChange::Delete { from } => self.deleted.push(from),
            ItemChange::Update { at } => self.updated.push(at),
            ItemChange::Move { from, to } => self.moved.push(ItemMove { from, to }),
        }
    }

    pub fn inserted(&self) -> &[IndexPath] {
        &self.inserted
    }

    pub fn deleted(&self) -> &[IndexPath] {
        &self.deleted
    }

    pub fn updated(&self) -> &[IndexPath] {
        &self.updated
    }

    pub fn moved(&self) -> &[ItemMove] {
        &self.moved
    }

    pub fn is_empty(&self) -> bool {
        self.inserted.is_empty() && self.deleted.is_empty() && self.updated.is_empty() && self.moved.is_empty()
    }

    pub fn clear(&mut self) {
        self.inserted.clear();
        self.deleted.clear();
        self.updated.clear();
        self.moved.clear();
    }
}

/// Pending entry counts, used in log lines and by callers that want to peek.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChangeSummary {
    pub inserted_sections: usize,
    pub deleted_sections: usize,
    pub inserted_items: usize,
    pub deleted_items: usize,
    pub updated_items: usize,
    pub moved_items: usize,
}

impl ChangeSummary {
    pub fn of(sections: &SectionChangeSet, items: &ItemChangeSet) -> Self {
        ChangeSummary {
            inserted_sections: sections.inserted.len(),
            deleted_sections: sections.deleted.len(),
            inserted_items: items.inserted.len(),
            deleted_items: items.deleted.len(),
            updated_items: items.updated.len(),
            moved_items: items.moved.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == ChangeSummary::default()
    }
}

impl fmt::Display for ChangeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "sections +{} -{}, items +{} -{} ~{} >{}",
            self.inserted_sections,
            self.deleted_sections,
            self.inserted_items,
            self.deleted_items,
            self.updated_items,
            self.moved_items
        )
    }
}

/// Process-unique id of one notification cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CycleId(pub u64);

impl fmt::Display for CycleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cycle#{}", self.0)
    }
}

/// Global cycle id generator (lock-free, atomic)
static CYCLE_COUNTER: Lazy<AtomicU64> = Lazy::new(|| AtomicU64::new(1));

pub fn next_cycle_id() -> CycleId {
    CycleId(CYCLE_COUNTER.fetch_add(1, Ordering::SeqCst))
}
