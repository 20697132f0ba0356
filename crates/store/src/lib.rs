//! `vitrine-store` — persistence boundary for the three entity kinds.
//!
//! One store, three kinds, and a deliberately closed set of statically-typed
//! accessors (no runtime type dispatch). The in-memory implementation is the
//! default for tests/dev; a Postgres implementation lives behind the
//! `postgres` feature.

pub mod error;
pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;
mod store;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
#[cfg(feature = "postgres")]
pub use postgres::PostgresStore;
pub use store::Store;
