use axum::Router;

pub mod auth;
pub mod projects;
pub mod ratings;
pub mod system;
pub mod users;

/// Router for everything except the health probe.
pub fn router() -> Router {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/projects", projects::router())
        .nest("/ratings", ratings::router())
}
