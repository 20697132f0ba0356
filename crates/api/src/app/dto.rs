use serde::{Deserialize, Serialize};

use vitrine_core::UserId;
use vitrine_model::{ProjectDraft, ScoreVector, User};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct NewProjectRequest {
    pub link: String,
    pub github: String,
    pub description: String,
    #[serde(default)]
    pub flags: String,
    #[serde(default)]
    pub picture: String,
    #[serde(default)]
    pub team: Vec<String>,
    #[serde(default)]
    pub theme: i32,
}

impl NewProjectRequest {
    pub fn into_draft(self) -> ProjectDraft {
        ProjectDraft {
            link: self.link,
            github: self.github,
            description: self.description,
            flags: self.flags,
            picture: self.picture,
            team: self.team.into_iter().map(UserId::new).collect(),
            theme: self.theme,
        }
    }
}

/// A vote as the client submits it: ordinal components 0..=4, mapped ×25
/// into the percentage domain before they reach the engine.
#[derive(Debug, Deserialize)]
pub struct UpdateRatingRequest {
    pub project_id: i64,
    pub design: i64,
    pub performance: i64,
    pub ease_of_use: i64,
    pub responsiveness: i64,
    pub motion: i64,
}

impl UpdateRatingRequest {
    pub fn ordinals(&self) -> [i64; 5] {
        [
            self.design,
            self.performance,
            self.ease_of_use,
            self.responsiveness,
            self.motion,
        ]
    }
}

// -------------------------
// Response views
// -------------------------

/// Shallow user representation used wherever a user appears inside another
/// entity's expansion.
#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    pub id: String,
    pub username: String,
    pub discriminator: String,
    pub avatar: String,
    pub project_id: Option<i64>,
}

pub fn user_view(user: &User) -> UserView {
    UserView {
        id: user.id.to_string(),
        username: user.username.clone(),
        discriminator: user.discriminator.clone(),
        avatar: user.avatar.clone(),
        project_id: user.project_id.map(|id| id.as_i64()),
    }
}

/// A project with its fields expanded through the loaders.
#[derive(Debug, Serialize)]
pub struct ProjectView {
    pub id: i64,
    pub owner: Option<UserView>,
    pub link: String,
    pub github: String,
    pub description: String,
    pub flags: String,
    pub picture: String,
    pub team: Vec<UserView>,
    pub theme: i32,
    pub rating: ScoreVector,
    pub ratings: Vec<RatingView>,
}

/// A rating with its owner expanded through the user loader.
#[derive(Debug, Serialize)]
pub struct RatingView {
    pub id: i64,
    pub project_id: i64,
    pub owner: Option<UserView>,
    #[serde(flatten)]
    pub scores: ScoreVector,
}

/// A user plus their (possibly absent) project, for the detail endpoint.
#[derive(Debug, Serialize)]
pub struct UserProfileView {
    #[serde(flatten)]
    pub user: UserView,
    pub project: Option<ProjectView>,
}
