//! User row: one account per identity-provider id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vitrine_core::{Entity, ProjectId, UserId};

/// A showcase account.
///
/// # Invariants
/// - `id` is the provider-issued identity key; it never changes.
/// - A user owns 0 or 1 project at any time (`project_id`).
///
/// Users are created lazily on first successful identity exchange and are
/// never deleted. `project_id` may reference a project that has since been
/// replaced; readers must tolerate a dangling back-reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub avatar: String,
    pub discriminator: String,
    pub email: Option<String>,
    pub project_id: Option<ProjectId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
