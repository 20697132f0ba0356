use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use vitrine_core::UserId;

use crate::app::{dto, query, resolvers};
use crate::context::RequestContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_users))
        .route("/:id", get(get_user))
}

pub async fn list_users(
    Extension(ctx): Extension<Arc<RequestContext>>,
) -> axum::response::Response {
    match query::users(&ctx).await {
        Some(users) => {
            let items: Vec<_> = users.iter().map(dto::user_view).collect();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        None => (StatusCode::OK, Json(serde_json::Value::Null)).into_response(),
    }
}

pub async fn get_user(
    Extension(ctx): Extension<Arc<RequestContext>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    match query::user(&ctx, UserId::new(id)).await {
        Some(user) => {
            let profile = resolvers::user_profile(&ctx, user).await;
            (StatusCode::OK, Json(profile)).into_response()
        }
        None => (StatusCode::OK, Json(serde_json::Value::Null)).into_response(),
    }
}
