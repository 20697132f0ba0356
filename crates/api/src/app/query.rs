//! The query surface the routes drive.
//!
//! Read operations are tolerant: "not found" and read-path store failures
//! both come back as `None`, matching the loader's fail-soft contract.
//! Mutations require the request's `(authorized, user_id)` pair; an
//! unauthenticated mutation is a no-op resolving to `None`, while domain
//! violations and write-path store failures surface as errors.

use vitrine_core::{ProjectId, UserId};
use vitrine_engine::{EngineError, replace_project, submit_rating};
use vitrine_model::{Project, ProjectDraft, Rating, ScoreVector, User};

use crate::context::RequestContext;

pub async fn user(ctx: &RequestContext, id: UserId) -> Option<User> {
    ctx.loaders.users.load(id).await
}

pub async fn users(ctx: &RequestContext) -> Option<Vec<User>> {
    match ctx.store.users().await {
        Ok(users) => Some(users),
        Err(err) => {
            tracing::warn!(error = %err, "user listing failed");
            None
        }
    }
}

pub async fn project(ctx: &RequestContext, id: ProjectId) -> Option<Project> {
    ctx.loaders.projects.load(id).await
}

pub async fn projects(ctx: &RequestContext) -> Option<Vec<Project>> {
    match ctx.store.projects().await {
        Ok(projects) => Some(projects),
        Err(err) => {
            tracing::warn!(error = %err, "project listing failed");
            None
        }
    }
}

/// Create (or resubmit) the authenticated user's project.
pub async fn new_project(
    ctx: &RequestContext,
    draft: ProjectDraft,
) -> Result<Option<Project>, EngineError> {
    let Some(user_id) = ctx.auth.user_id() else {
        tracing::warn!("unauthenticated project submission ignored");
        return Ok(None);
    };

    let Some(user) = ctx.loaders.users.load(user_id.clone()).await else {
        tracing::warn!(user = %user_id, "authorized user has no backing row");
        return Ok(None);
    };

    let project = replace_project(ctx.store.as_ref(), &user, &draft).await?;
    Ok(Some(project))
}

/// Apply the authenticated user's vote to a project.
///
/// `ordinals` are the raw client components (0..=4); they are mapped into
/// the percentage domain before the engine sees them. A missing project
/// resolves to `None` like any other read miss.
pub async fn update_rating(
    ctx: &RequestContext,
    project_id: ProjectId,
    ordinals: [i64; 5],
) -> Result<Option<Rating>, EngineError> {
    let Some(voter_id) = ctx.auth.user_id() else {
        tracing::warn!(project = %project_id, "unauthenticated vote ignored");
        return Ok(None);
    };

    let scores = ScoreVector::from_ordinals(ordinals)?;

    let Some(project) = ctx.loaders.projects.load(project_id).await else {
        return Ok(None);
    };

    let rating = submit_rating(ctx.store.as_ref(), voter_id, &project, scores).await?;
    Ok(Some(rating))
}
