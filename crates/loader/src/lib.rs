//! `vitrine-loader` — request-scoped batched entity loading.
//!
//! A query resolves an arbitrary graph of fields, many of which independently
//! request the same or related entities. The loader coalesces
//! concurrent-in-flight lookups for one entity kind into a single store call,
//! memoizes results for the lifetime of one inbound request, and hands back
//! per-key results without blocking unrelated lookups.
//!
//! Loaders are never shared across requests: build a fresh [`Loaders`] per
//! inbound request and drop it with the request.

mod loader;
mod registry;
mod source;

pub use loader::Loader;
pub use registry::Loaders;
pub use source::{BatchSource, ProjectSource, RatingSource, UserSource};
