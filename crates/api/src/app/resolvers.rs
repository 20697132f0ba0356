//! Field resolution through the per-request loaders.
//!
//! This is where the fan-out happens: expanding one project touches its
//! owner, every team member, every contributing rating, and every rating's
//! owner. All of those lookups are issued concurrently so each entity kind
//! collapses into (at most) one store call per dispatch window, regardless
//! of result-set size.

use futures::future::join_all;

use vitrine_model::{Project, Rating, User};

use crate::app::dto::{self, ProjectView, RatingView, UserProfileView};
use crate::context::RequestContext;

/// Expand a project: owner, team, and contributing ratings (with owners).
pub async fn project_view(ctx: &RequestContext, project: Project) -> ProjectView {
    let owner = ctx.loaders.users.load(project.owner_id.clone());
    let team = join_all(
        project
            .team
            .iter()
            .cloned()
            .map(|id| ctx.loaders.users.load(id)),
    );
    let ratings = join_all(
        project
            .rating_ids
            .iter()
            .copied()
            .map(|id| ctx.loaders.ratings.load(id)),
    );

    let (owner, team, ratings) = tokio::join!(owner, team, ratings);

    let ratings: Vec<Rating> = ratings.into_iter().flatten().collect();
    let ratings = join_all(ratings.into_iter().map(|r| rating_view(ctx, r))).await;

    ProjectView {
        id: project.id.as_i64(),
        owner: owner.as_ref().map(dto::user_view),
        link: project.link,
        github: project.github,
        description: project.description,
        flags: project.flags,
        picture: project.picture,
        team: team.iter().flatten().map(dto::user_view).collect(),
        theme: project.theme,
        rating: project.rating,
        ratings,
    }
}

/// Expand a rating's owner. The rating's project is deliberately not
/// expanded here: a rating can outlive its project, and the view's
/// `project_id` is all a client needs to follow the edge.
pub async fn rating_view(ctx: &RequestContext, rating: Rating) -> RatingView {
    let owner = ctx.loaders.users.load(rating.owner_id.clone()).await;

    RatingView {
        id: rating.id.as_i64(),
        project_id: rating.project_id.as_i64(),
        owner: owner.as_ref().map(dto::user_view),
        scores: rating.scores,
    }
}

/// Expand a user's owned project, tolerating a dangling back-reference.
pub async fn user_profile(ctx: &RequestContext, user: User) -> UserProfileView {
    let project = match user.project_id {
        Some(id) => ctx.loaders.projects.load(id).await,
        None => None,
    };

    let project = match project {
        Some(project) => Some(project_view(ctx, project).await),
        None => None,
    };

    UserProfileView {
        user: dto::user_view(&user),
        project,
    }
}
