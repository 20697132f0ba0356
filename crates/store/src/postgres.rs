//! Postgres-backed entity store.
//!
//! Uses plain `sqlx::query` with explicit binds and manual row mapping so the
//! crate builds without a live database. The unique constraint on
//! `(owner_id, project_id)` in `ratings` backs the one-vote-per-pair rule at
//! the storage level; array columns carry the team and the aggregate vector.

use std::sync::Arc;

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;

use vitrine_core::{ProjectId, RatingId, UserId};
use vitrine_model::{
    IdentityProfile, Project, ProjectDraft, Rating, RatingDraft, ScoreVector, User,
};

use crate::error::{StoreError, StoreResult};
use crate::store::Store;

use async_trait::async_trait;

/// Postgres entity store over a shared connection pool.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: Arc<PgPool>,
}

const CREATE_USERS: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id            TEXT PRIMARY KEY,
    username      TEXT NOT NULL,
    avatar        TEXT NOT NULL,
    discriminator TEXT NOT NULL,
    email         TEXT,
    project_id    BIGINT,
    created_at    TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at    TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

const CREATE_PROJECTS: &str = r#"
CREATE TABLE IF NOT EXISTS projects (
    id          BIGSERIAL PRIMARY KEY,
    owner_id    TEXT NOT NULL,
    link        TEXT NOT NULL,
    github      TEXT NOT NULL,
    description TEXT NOT NULL,
    flags       TEXT NOT NULL,
    picture     TEXT NOT NULL,
    team        TEXT[] NOT NULL DEFAULT '{}',
    theme       INT NOT NULL DEFAULT 0,
    rating      BIGINT[] NOT NULL DEFAULT '{0,0,0,0,0}',
    rating_ids  BIGINT[] NOT NULL DEFAULT '{}',
    created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

const CREATE_RATINGS: &str = r#"
CREATE TABLE IF NOT EXISTS ratings (
    id             BIGSERIAL PRIMARY KEY,
    owner_id       TEXT NOT NULL,
    project_id     BIGINT NOT NULL,
    design         BIGINT NOT NULL,
    performance    BIGINT NOT NULL,
    ease_of_use    BIGINT NOT NULL,
    responsiveness BIGINT NOT NULL,
    motion         BIGINT NOT NULL,
    created_at     TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at     TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    UNIQUE (owner_id, project_id)
)
"#;

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Create the three tables if they do not exist yet.
    ///
    /// The statements are independent, so they run as a fixed task group
    /// joined explicitly; any failure aborts startup.
    #[instrument(skip(self), err)]
    pub async fn migrate(&self) -> StoreResult<()> {
        let users = async {
            sqlx::query(CREATE_USERS)
                .execute(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("migrate users", e))
        };
        let projects = async {
            sqlx::query(CREATE_PROJECTS)
                .execute(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("migrate projects", e))
        };
        let ratings = async {
            sqlx::query(CREATE_RATINGS)
                .execute(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("migrate ratings", e))
        };

        tokio::try_join!(users, projects, ratings)?;
        tracing::info!("schema migration complete");
        Ok(())
    }
}

fn map_sqlx_error(op: &str, e: sqlx::Error) -> StoreError {
    StoreError::backend(format!("{op}: {e}"))
}

fn score_from_array(raw: Vec<i64>) -> ScoreVector {
    match <[i64; 5]>::try_from(raw) {
        Ok(components) => ScoreVector::from_components(components),
        Err(_) => ScoreVector::zero(),
    }
}

fn user_from_row(row: &PgRow) -> Result<User, sqlx::Error> {
    Ok(User {
        id: UserId::new(row.try_get::<String, _>("id")?),
        username: row.try_get("username")?,
        avatar: row.try_get("avatar")?,
        discriminator: row.try_get("discriminator")?,
        email: row.try_get("email")?,
        project_id: row
            .try_get::<Option<i64>, _>("project_id")?
            .map(ProjectId::new),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn project_from_row(row: &PgRow) -> Result<Project, sqlx::Error> {
    Ok(Project {
        id: ProjectId::new(row.try_get::<i64, _>("id")?),
        owner_id: UserId::new(row.try_get::<String, _>("owner_id")?),
        link: row.try_get("link")?,
        github: row.try_get("github")?,
        description: row.try_get("description")?,
        flags: row.try_get("flags")?,
        picture: row.try_get("picture")?,
        team: row
            .try_get::<Vec<String>, _>("team")?
            .into_iter()
            .map(UserId::new)
            .collect(),
        theme: row.try_get::<i32, _>("theme")?,
        rating: score_from_array(row.try_get::<Vec<i64>, _>("rating")?),
        rating_ids: row
            .try_get::<Vec<i64>, _>("rating_ids")?
            .into_iter()
            .map(RatingId::new)
            .collect(),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn rating_from_row(row: &PgRow) -> Result<Rating, sqlx::Error> {
    Ok(Rating {
        id: RatingId::new(row.try_get::<i64, _>("id")?),
        owner_id: UserId::new(row.try_get::<String, _>("owner_id")?),
        project_id: ProjectId::new(row.try_get::<i64, _>("project_id")?),
        scores: ScoreVector::new(
            row.try_get("design")?,
            row.try_get("performance")?,
            row.try_get("ease_of_use")?,
            row.try_get("responsiveness")?,
            row.try_get("motion")?,
        ),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

const USER_COLUMNS: &str =
    "id, username, avatar, discriminator, email, project_id, created_at, updated_at";
const PROJECT_COLUMNS: &str = "id, owner_id, link, github, description, flags, picture, team, theme, rating, rating_ids, created_at, updated_at";
const RATING_COLUMNS: &str = "id, owner_id, project_id, design, performance, ease_of_use, responsiveness, motion, created_at, updated_at";

#[async_trait]
impl Store for PostgresStore {
    async fn user(&self, id: &UserId) -> StoreResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id.as_str())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("user", e))?;

        row.as_ref()
            .map(user_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("user row", e))
    }

    async fn users_by_ids(&self, ids: &[UserId]) -> StoreResult<Vec<User>> {
        let raw: Vec<String> = ids.iter().map(|id| id.as_str().to_string()).collect();
        let rows = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ANY($1)"
        ))
        .bind(&raw)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("users_by_ids", e))?;

        rows.iter()
            .map(user_from_row)
            .collect::<Result<_, _>>()
            .map_err(|e| map_sqlx_error("users_by_ids row", e))
    }

    async fn users(&self) -> StoreResult<Vec<User>> {
        let rows = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("users", e))?;

        rows.iter()
            .map(user_from_row)
            .collect::<Result<_, _>>()
            .map_err(|e| map_sqlx_error("users row", e))
    }

    async fn create_user_if_absent(&self, profile: &IdentityProfile) -> StoreResult<User> {
        sqlx::query(
            r#"
            INSERT INTO users (id, username, avatar, discriminator, email)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(profile.id.as_str())
        .bind(&profile.username)
        .bind(&profile.avatar)
        .bind(&profile.discriminator)
        .bind(&profile.email)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_user_if_absent", e))?;

        match self.user(&profile.id).await? {
            Some(user) => Ok(user),
            None => Err(StoreError::missing_row("user", profile.id.to_string())),
        }
    }

    async fn update_user(&self, user: &User) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET username = $2, avatar = $3, discriminator = $4, email = $5,
                project_id = $6, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user.id.as_str())
        .bind(&user.username)
        .bind(&user.avatar)
        .bind(&user.discriminator)
        .bind(&user.email)
        .bind(user.project_id.map(|p| p.as_i64()))
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_user", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::missing_row("user", user.id.to_string()));
        }
        Ok(())
    }

    async fn project(&self, id: ProjectId) -> StoreResult<Option<Project>> {
        let row = sqlx::query(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1"
        ))
        .bind(id.as_i64())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("project", e))?;

        row.as_ref()
            .map(project_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("project row", e))
    }

    async fn projects_by_ids(&self, ids: &[ProjectId]) -> StoreResult<Vec<Project>> {
        let raw: Vec<i64> = ids.iter().map(|id| id.as_i64()).collect();
        let rows = sqlx::query(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ANY($1)"
        ))
        .bind(&raw)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("projects_by_ids", e))?;

        rows.iter()
            .map(project_from_row)
            .collect::<Result<_, _>>()
            .map_err(|e| map_sqlx_error("projects_by_ids row", e))
    }

    async fn projects(&self) -> StoreResult<Vec<Project>> {
        let rows = sqlx::query(&format!("SELECT {PROJECT_COLUMNS} FROM projects ORDER BY id"))
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("projects", e))?;

        rows.iter()
            .map(project_from_row)
            .collect::<Result<_, _>>()
            .map_err(|e| map_sqlx_error("projects row", e))
    }

    #[instrument(skip(self, draft), fields(owner_id = %owner_id), err)]
    async fn create_project(&self, owner_id: &UserId, draft: &ProjectDraft) -> StoreResult<Project> {
        let team: Vec<String> = draft.team.iter().map(|id| id.as_str().to_string()).collect();
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO projects (owner_id, link, github, description, flags, picture, team, theme)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {PROJECT_COLUMNS}
            "#
        ))
        .bind(owner_id.as_str())
        .bind(&draft.link)
        .bind(&draft.github)
        .bind(&draft.description)
        .bind(&draft.flags)
        .bind(&draft.picture)
        .bind(&team)
        .bind(draft.theme)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_project", e))?;

        project_from_row(&row).map_err(|e| map_sqlx_error("create_project row", e))
    }

    async fn update_project(&self, project: &Project) -> StoreResult<()> {
        let team: Vec<String> = project.team.iter().map(|id| id.as_str().to_string()).collect();
        let rating: Vec<i64> = project.rating.components().to_vec();
        let rating_ids: Vec<i64> = project.rating_ids.iter().map(|id| id.as_i64()).collect();

        let result = sqlx::query(
            r#"
            UPDATE projects
            SET link = $2, github = $3, description = $4, flags = $5, picture = $6,
                team = $7, theme = $8, rating = $9, rating_ids = $10, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(project.id.as_i64())
        .bind(&project.link)
        .bind(&project.github)
        .bind(&project.description)
        .bind(&project.flags)
        .bind(&project.picture)
        .bind(&team)
        .bind(project.theme)
        .bind(&rating)
        .bind(&rating_ids)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_project", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::missing_row("project", project.id.to_string()));
        }
        Ok(())
    }

    async fn delete_project(&self, id: ProjectId) -> StoreResult<()> {
        sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id.as_i64())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_project", e))?;
        Ok(())
    }

    async fn rating(&self, id: RatingId) -> StoreResult<Option<Rating>> {
        let row = sqlx::query(&format!(
            "SELECT {RATING_COLUMNS} FROM ratings WHERE id = $1"
        ))
        .bind(id.as_i64())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("rating", e))?;

        row.as_ref()
            .map(rating_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("rating row", e))
    }

    async fn ratings_by_ids(&self, ids: &[RatingId]) -> StoreResult<Vec<Rating>> {
        let raw: Vec<i64> = ids.iter().map(|id| id.as_i64()).collect();
        let rows = sqlx::query(&format!(
            "SELECT {RATING_COLUMNS} FROM ratings WHERE id = ANY($1)"
        ))
        .bind(&raw)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("ratings_by_ids", e))?;

        rows.iter()
            .map(rating_from_row)
            .collect::<Result<_, _>>()
            .map_err(|e| map_sqlx_error("ratings_by_ids row", e))
    }

    async fn ratings_for_project(&self, id: ProjectId) -> StoreResult<Vec<Rating>> {
        let rows = sqlx::query(&format!(
            "SELECT {RATING_COLUMNS} FROM ratings WHERE project_id = $1 ORDER BY id"
        ))
        .bind(id.as_i64())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("ratings_for_project", e))?;

        rows.iter()
            .map(rating_from_row)
            .collect::<Result<_, _>>()
            .map_err(|e| map_sqlx_error("ratings_for_project row", e))
    }

    async fn rating_by_owner_and_project(
        &self,
        owner_id: &UserId,
        project_id: ProjectId,
    ) -> StoreResult<Option<Rating>> {
        let row = sqlx::query(&format!(
            "SELECT {RATING_COLUMNS} FROM ratings WHERE owner_id = $1 AND project_id = $2"
        ))
        .bind(owner_id.as_str())
        .bind(project_id.as_i64())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("rating_by_owner_and_project", e))?;

        row.as_ref()
            .map(rating_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("rating_by_owner_and_project row", e))
    }

    async fn create_rating(&self, draft: &RatingDraft) -> StoreResult<Rating> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO ratings (owner_id, project_id, design, performance, ease_of_use, responsiveness, motion)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {RATING_COLUMNS}
            "#
        ))
        .bind(draft.owner_id.as_str())
        .bind(draft.project_id.as_i64())
        .bind(draft.scores.design)
        .bind(draft.scores.performance)
        .bind(draft.scores.ease_of_use)
        .bind(draft.scores.responsiveness)
        .bind(draft.scores.motion)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_rating", e))?;

        rating_from_row(&row).map_err(|e| map_sqlx_error("create_rating row", e))
    }

    async fn update_rating(&self, rating: &Rating) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE ratings
            SET design = $2, performance = $3, ease_of_use = $4,
                responsiveness = $5, motion = $6, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(rating.id.as_i64())
        .bind(rating.scores.design)
        .bind(rating.scores.performance)
        .bind(rating.scores.ease_of_use)
        .bind(rating.scores.responsiveness)
        .bind(rating.scores.motion)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_rating", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::missing_row("rating", rating.id.to_string()));
        }
        Ok(())
    }
}
