//! `vitrine-model` — the three entity kinds and the score domain.
//!
//! Rows are plain data: the entity store owns persistence, the loader and
//! engine hold only transient copies for the duration of one request.

pub mod identity;
pub mod project;
pub mod rating;
pub mod score;
pub mod user;

pub use identity::IdentityProfile;
pub use project::{Project, ProjectDraft};
pub use rating::{Rating, RatingDraft};
pub use score::ScoreVector;
pub use user::User;
