//! Engine failure model: caller contract violations and store failures.

use thiserror::Error;

use vitrine_core::DomainError;
use vitrine_store::StoreError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The caller violated a domain rule (unknown voter, out-of-domain
    /// score component). Must be surfaced, never swallowed.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The underlying persistence call failed. Silently losing a write is
    /// unacceptable, so these propagate.
    #[error(transparent)]
    Store(#[from] StoreError),
}
