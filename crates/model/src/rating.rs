//! Rating row: one user's vote on one project.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vitrine_core::{Entity, ProjectId, RatingId, UserId};

use crate::score::ScoreVector;

/// One vote.
///
/// # Invariants
/// - At most one rating exists per `(owner_id, project_id)` pair; a
///   resubmission updates the existing row in place (same id).
///
/// Ratings are never deleted; a rating may outlive its project (replacement
/// orphans the old project's ratings) and readers must tolerate that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    pub id: RatingId,
    pub owner_id: UserId,
    pub project_id: ProjectId,
    pub scores: ScoreVector,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Rating {
    type Id = RatingId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// A vote before the store has assigned it an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingDraft {
    pub owner_id: UserId,
    pub project_id: ProjectId,
    pub scores: ScoreVector,
}
