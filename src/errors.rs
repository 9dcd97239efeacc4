// /src/errors.rs
//! Error types for recording, configuring and applying change cycles
use crate::types::{ChangeKind, IndexPath};
use thiserror::Error;

/// Which side of an item change a position belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionRole {
    Source,
    Target,
}

impl std::fmt::Display for PositionRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PositionRole::Source => f.write_str("source"),
            PositionRole::Target => f.write_str("target"),
        }
    }
}

#[derive(Error, Debug)]
pub enum ReconcilerError {
    #[error("{kind} item change requires a {role} position")]
    MissingPosition { kind: ChangeKind, role: PositionRole },

    #[error("{kind} item change does not take a {role} position (got {position})")]
    UnexpectedPosition {
        kind: ChangeKind,
        role: PositionRole,
        position: IndexPath,
    },

    #[error("section changes must be Insert or Delete, got {0}")]
    UnsupportedSectionChange(ChangeKind),

    #[error("section {index} already recorded as {existing} in this cycle, cannot record {requested}")]
    ConflictingSectionChange {
        index: usize,
        existing: ChangeKind,
        requested: ChangeKind,
    },

    #[error("no change cycle is open; call begin_cycle() first")]
    NoOpenCycle,

    #[error("Unknown change kind: {0}")]
    UnknownChangeKind(String),

    #[error("Invalid reconciler config: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Reconciler state lock poisoned: {0}")]
    LockPoisoned(String),
}

/// Reported by a rendering collaborator that refused an edit batch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("position {path} is out of range for the container")]
    IndexOutOfRange { path: IndexPath },

    #[error("section {section} is out of range for the container")]
    SectionOutOfRange { section: usize },

    #[error("inconsistent batch: {0}")]
    Inconsistent(String),
}

#[cfg(feature = "python")]
impl From<ReconcilerError> for pyo3::PyErr {
    fn from(err: ReconcilerError) -> Self {
        pyo3::exceptions::PyValueError::new_err(err.to_string())
    }
}
