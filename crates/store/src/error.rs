//! Store failure model.
//!
//! Read-path callers (the loaders) absorb these into "not found"; write-path
//! callers (the engine, project management) must propagate them.

use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The underlying persistence call failed (connectivity, constraint
    /// violation, serialization).
    #[error("store backend failure: {0}")]
    Backend(String),

    /// A row that a write expected to exist was gone.
    #[error("{kind} {id} does not exist")]
    MissingRow { kind: &'static str, id: String },

    /// In-memory table lock was poisoned by a panicking writer.
    #[error("store lock poisoned")]
    LockPoisoned,
}

impl StoreError {
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    pub fn missing_row(kind: &'static str, id: impl Into<String>) -> Self {
        Self::MissingRow {
            kind,
            id: id.into(),
        }
    }
}
