//! The entity store contract.

use async_trait::async_trait;

use vitrine_core::{ProjectId, RatingId, UserId};
use vitrine_model::{IdentityProfile, Project, ProjectDraft, Rating, RatingDraft, User};

use crate::error::StoreResult;

/// Typed accessors over the three entity kinds.
///
/// Semantics the loader and engine depend on:
/// - `*_by_ids` returns only the matches found; a missing id is simply
///   absent from the result, never a per-id error.
/// - Single-row getters return `Ok(None)` for "no such row"; `Err` is
///   reserved for backend failure.
/// - `create_user_if_absent` is keyed by the provider identity id and
///   returns the existing row untouched when one exists.
/// - `delete_project` is idempotent; deleting an absent row is not an error.
#[async_trait]
pub trait Store: Send + Sync {
    // Users ──────────────────────────────────────────────────────────────

    async fn user(&self, id: &UserId) -> StoreResult<Option<User>>;

    async fn users_by_ids(&self, ids: &[UserId]) -> StoreResult<Vec<User>>;

    async fn users(&self) -> StoreResult<Vec<User>>;

    async fn create_user_if_absent(&self, profile: &IdentityProfile) -> StoreResult<User>;

    async fn update_user(&self, user: &User) -> StoreResult<()>;

    // Projects ───────────────────────────────────────────────────────────

    async fn project(&self, id: ProjectId) -> StoreResult<Option<Project>>;

    async fn projects_by_ids(&self, ids: &[ProjectId]) -> StoreResult<Vec<Project>>;

    async fn projects(&self) -> StoreResult<Vec<Project>>;

    /// Create a project owned by `owner_id`. The store assigns the id and
    /// starts the aggregate at zero with no contributing ratings.
    async fn create_project(&self, owner_id: &UserId, draft: &ProjectDraft) -> StoreResult<Project>;

    async fn update_project(&self, project: &Project) -> StoreResult<()>;

    async fn delete_project(&self, id: ProjectId) -> StoreResult<()>;

    // Ratings ────────────────────────────────────────────────────────────

    async fn rating(&self, id: RatingId) -> StoreResult<Option<Rating>>;

    async fn ratings_by_ids(&self, ids: &[RatingId]) -> StoreResult<Vec<Rating>>;

    /// The full, current set of ratings targeting one project.
    async fn ratings_for_project(&self, id: ProjectId) -> StoreResult<Vec<Rating>>;

    /// The unique rating for one `(owner, project)` pair, if any.
    async fn rating_by_owner_and_project(
        &self,
        owner_id: &UserId,
        project_id: ProjectId,
    ) -> StoreResult<Option<Rating>>;

    async fn create_rating(&self, draft: &RatingDraft) -> StoreResult<Rating>;

    async fn update_rating(&self, rating: &Rating) -> StoreResult<()>;
}
