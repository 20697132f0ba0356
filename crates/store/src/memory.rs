//! In-memory entity store.
//!
//! Intended for tests/dev. Not optimized for performance.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use vitrine_core::{ProjectId, RatingId, UserId};
use vitrine_model::{
    IdentityProfile, Project, ProjectDraft, Rating, RatingDraft, ScoreVector, User,
};

use crate::error::{StoreError, StoreResult};
use crate::store::Store;

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<UserId, User>,
    projects: BTreeMap<ProjectId, Project>,
    ratings: BTreeMap<RatingId, Rating>,
    next_project_id: i64,
    next_rating_id: i64,
}

/// In-memory store over `RwLock`-guarded tables.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<std::sync::RwLockReadGuard<'_, Tables>> {
        self.tables.read().map_err(|_| StoreError::LockPoisoned)
    }

    fn write(&self) -> StoreResult<std::sync::RwLockWriteGuard<'_, Tables>> {
        self.tables.write().map_err(|_| StoreError::LockPoisoned)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn user(&self, id: &UserId) -> StoreResult<Option<User>> {
        Ok(self.read()?.users.get(id).cloned())
    }

    async fn users_by_ids(&self, ids: &[UserId]) -> StoreResult<Vec<User>> {
        let tables = self.read()?;
        Ok(ids.iter().filter_map(|id| tables.users.get(id).cloned()).collect())
    }

    async fn users(&self) -> StoreResult<Vec<User>> {
        let tables = self.read()?;
        let mut users: Vec<User> = tables.users.values().cloned().collect();
        users.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));
        Ok(users)
    }

    async fn create_user_if_absent(&self, profile: &IdentityProfile) -> StoreResult<User> {
        let mut tables = self.write()?;

        if let Some(existing) = tables.users.get(&profile.id) {
            return Ok(existing.clone());
        }

        let now = Utc::now();
        let user = User {
            id: profile.id.clone(),
            username: profile.username.clone(),
            avatar: profile.avatar.clone(),
            discriminator: profile.discriminator.clone(),
            email: profile.email.clone(),
            project_id: None,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn update_user(&self, user: &User) -> StoreResult<()> {
        let mut tables = self.write()?;
        if !tables.users.contains_key(&user.id) {
            return Err(StoreError::missing_row("user", user.id.to_string()));
        }

        let mut row = user.clone();
        row.updated_at = Utc::now();
        tables.users.insert(row.id.clone(), row);
        Ok(())
    }

    async fn project(&self, id: ProjectId) -> StoreResult<Option<Project>> {
        Ok(self.read()?.projects.get(&id).cloned())
    }

    async fn projects_by_ids(&self, ids: &[ProjectId]) -> StoreResult<Vec<Project>> {
        let tables = self.read()?;
        Ok(ids.iter().filter_map(|id| tables.projects.get(id).cloned()).collect())
    }

    async fn projects(&self) -> StoreResult<Vec<Project>> {
        Ok(self.read()?.projects.values().cloned().collect())
    }

    async fn create_project(&self, owner_id: &UserId, draft: &ProjectDraft) -> StoreResult<Project> {
        let mut tables = self.write()?;

        tables.next_project_id += 1;
        let now = Utc::now();
        let project = Project {
            id: ProjectId::new(tables.next_project_id),
            owner_id: owner_id.clone(),
            link: draft.link.clone(),
            github: draft.github.clone(),
            description: draft.description.clone(),
            flags: draft.flags.clone(),
            picture: draft.picture.clone(),
            team: draft.team.clone(),
            theme: draft.theme,
            rating: ScoreVector::zero(),
            rating_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        tables.projects.insert(project.id, project.clone());
        Ok(project)
    }

    async fn update_project(&self, project: &Project) -> StoreResult<()> {
        let mut tables = self.write()?;
        if !tables.projects.contains_key(&project.id) {
            return Err(StoreError::missing_row("project", project.id.to_string()));
        }

        let mut row = project.clone();
        row.updated_at = Utc::now();
        tables.projects.insert(row.id, row);
        Ok(())
    }

    async fn delete_project(&self, id: ProjectId) -> StoreResult<()> {
        self.write()?.projects.remove(&id);
        Ok(())
    }

    async fn rating(&self, id: RatingId) -> StoreResult<Option<Rating>> {
        Ok(self.read()?.ratings.get(&id).cloned())
    }

    async fn ratings_by_ids(&self, ids: &[RatingId]) -> StoreResult<Vec<Rating>> {
        let tables = self.read()?;
        Ok(ids.iter().filter_map(|id| tables.ratings.get(id).cloned()).collect())
    }

    async fn ratings_for_project(&self, id: ProjectId) -> StoreResult<Vec<Rating>> {
        let tables = self.read()?;
        Ok(tables
            .ratings
            .values()
            .filter(|r| r.project_id == id)
            .cloned()
            .collect())
    }

    async fn rating_by_owner_and_project(
        &self,
        owner_id: &UserId,
        project_id: ProjectId,
    ) -> StoreResult<Option<Rating>> {
        let tables = self.read()?;
        Ok(tables
            .ratings
            .values()
            .find(|r| &r.owner_id == owner_id && r.project_id == project_id)
            .cloned())
    }

    async fn create_rating(&self, draft: &RatingDraft) -> StoreResult<Rating> {
        let mut tables = self.write()?;

        tables.next_rating_id += 1;
        let now = Utc::now();
        let rating = Rating {
            id: RatingId::new(tables.next_rating_id),
            owner_id: draft.owner_id.clone(),
            project_id: draft.project_id,
            scores: draft.scores,
            created_at: now,
            updated_at: now,
        };
        tables.ratings.insert(rating.id, rating.clone());
        Ok(rating)
    }

    async fn update_rating(&self, rating: &Rating) -> StoreResult<()> {
        let mut tables = self.write()?;
        if !tables.ratings.contains_key(&rating.id) {
            return Err(StoreError::missing_row("rating", rating.id.to_string()));
        }

        let mut row = rating.clone();
        row.updated_at = Utc::now();
        tables.ratings.insert(row.id, row);
        Ok(())
    }
}
