//! Project row and the submission draft it is created from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vitrine_core::{Entity, ProjectId, RatingId, UserId};

use crate::score::ScoreVector;

/// A submitted showcase project.
///
/// # Invariants
/// - `rating_ids` always equals the full set of rating rows whose
///   `project_id` is this project's id.
/// - `rating` always equals the componentwise truncated mean of those
///   ratings, or the zero vector if none exist.
///
/// Projects are replaced (delete-then-recreate) on resubmission, so `id` and
/// `rating_ids` are **not** stable across resubmission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub owner_id: UserId,
    pub link: String,
    pub github: String,
    pub description: String,
    pub flags: String,
    pub picture: String,
    pub team: Vec<UserId>,
    pub theme: i32,
    pub rating: ScoreVector,
    pub rating_ids: Vec<RatingId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Project {
    type Id = ProjectId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Fields a user submits when creating (or resubmitting) their project.
///
/// The store assigns the id, stamps the owner, and starts the aggregate at
/// zero with no contributing ratings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDraft {
    pub link: String,
    pub github: String,
    pub description: String,
    pub flags: String,
    pub picture: String,
    pub team: Vec<UserId>,
    pub theme: i32,
}
