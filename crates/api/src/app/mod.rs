//! HTTP application wiring (Axum router + service wiring).
//!
//! Layout:
//! - `routes/`: HTTP routes + handlers (one file per domain area)
//! - `query.rs`: the query surface the routes drive
//! - `resolvers.rs`: field expansion through the per-request loaders
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use vitrine_auth::JwtProvider;
use vitrine_store::Store;

use crate::config::Config;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod query;
pub mod resolvers;
pub mod routes;

/// Process-wide services shared by the handlers.
///
/// Per-request state (loaders, auth) lives in `RequestContext`, not here.
pub struct AppServices {
    pub jwt: JwtProvider,
    pub http: reqwest::Client,
    pub config: Config,
}

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(store: Arc<dyn Store>, config: Config) -> Router {
    let jwt = JwtProvider::new(config.jwt_secret.clone());
    let services = Arc::new(AppServices {
        jwt: jwt.clone(),
        http: reqwest::Client::new(),
        config,
    });
    let context_state = middleware::ContextState { store, jwt };

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router())
        .layer(
            // Outermost first: access log, then context construction, then
            // the shared services handle.
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(middleware::request_log))
                .layer(axum::middleware::from_fn_with_state(
                    context_state,
                    middleware::context_middleware,
                ))
                .layer(Extension(services)),
        )
}
