//! Batch sources: the bridge between a loader and the entity store.

use std::sync::Arc;

use async_trait::async_trait;

use vitrine_core::{ProjectId, RatingId, UserId};
use vitrine_model::{Project, Rating, User};
use vitrine_store::{Store, StoreError};

/// One entity kind's fetch interface, as the loader sees it.
///
/// `load_many` returns `(key, value)` pairs so the loader can match results
/// back to their originating keys strictly by identity, never by position.
/// Missing keys are simply absent from the result. `load_one` is the
/// optimized single-key path; it must be semantically identical to a
/// one-element `load_many`.
#[async_trait]
pub trait BatchSource: Send + Sync + 'static {
    type Key: Clone + Eq + std::hash::Hash + std::fmt::Debug + Send + Sync + 'static;
    type Value: Clone + Send + Sync + 'static;

    /// Entity kind tag, used for log events only.
    const KIND: &'static str;

    async fn load_one(&self, key: &Self::Key) -> Result<Option<Self::Value>, StoreError>;

    async fn load_many(
        &self,
        keys: &[Self::Key],
    ) -> Result<Vec<(Self::Key, Self::Value)>, StoreError>;
}

/// Users by identity id.
pub struct UserSource {
    store: Arc<dyn Store>,
}

impl UserSource {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl BatchSource for UserSource {
    type Key = UserId;
    type Value = User;

    const KIND: &'static str = "user";

    async fn load_one(&self, key: &UserId) -> Result<Option<User>, StoreError> {
        self.store.user(key).await
    }

    async fn load_many(&self, keys: &[UserId]) -> Result<Vec<(UserId, User)>, StoreError> {
        let users = self.store.users_by_ids(keys).await?;
        Ok(users.into_iter().map(|u| (u.id.clone(), u)).collect())
    }
}

/// Projects by surrogate id.
pub struct ProjectSource {
    store: Arc<dyn Store>,
}

impl ProjectSource {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl BatchSource for ProjectSource {
    type Key = ProjectId;
    type Value = Project;

    const KIND: &'static str = "project";

    async fn load_one(&self, key: &ProjectId) -> Result<Option<Project>, StoreError> {
        self.store.project(*key).await
    }

    async fn load_many(
        &self,
        keys: &[ProjectId],
    ) -> Result<Vec<(ProjectId, Project)>, StoreError> {
        let projects = self.store.projects_by_ids(keys).await?;
        Ok(projects.into_iter().map(|p| (p.id, p)).collect())
    }
}

/// Ratings by surrogate id.
pub struct RatingSource {
    store: Arc<dyn Store>,
}

impl RatingSource {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl BatchSource for RatingSource {
    type Key = RatingId;
    type Value = Rating;

    const KIND: &'static str = "rating";

    async fn load_one(&self, key: &RatingId) -> Result<Option<Rating>, StoreError> {
        self.store.rating(*key).await
    }

    async fn load_many(&self, keys: &[RatingId]) -> Result<Vec<(RatingId, Rating)>, StoreError> {
        let ratings = self.store.ratings_by_ids(keys).await?;
        Ok(ratings.into_iter().map(|r| (r.id, r)).collect())
    }
}
