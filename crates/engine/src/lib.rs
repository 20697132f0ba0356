//! `vitrine-engine` — vote application and aggregate maintenance.
//!
//! Write paths live here: the one-vote-per-pair upsert with aggregate
//! recomputation, and the delete-then-recreate project ownership transition.
//! Unlike the read paths (which degrade to "not found"), every store failure
//! on these paths propagates to the caller.

pub mod error;
pub mod project;
pub mod rating;

pub use error::EngineError;
pub use project::replace_project;
pub use rating::{recalculate_project_rating, submit_rating};
