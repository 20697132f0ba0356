use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use futures::future::join_all;

use vitrine_core::ProjectId;

use crate::app::{dto, errors, query, resolvers};
use crate::context::RequestContext;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_project).get(list_projects))
        .route("/:id", get(get_project))
}

pub async fn list_projects(
    Extension(ctx): Extension<Arc<RequestContext>>,
) -> axum::response::Response {
    let Some(projects) = query::projects(&ctx).await else {
        return (StatusCode::OK, Json(serde_json::Value::Null)).into_response();
    };

    // Expanding every project concurrently is the loader's whole reason to
    // exist: n projects resolve their owners and ratings through one batch
    // per entity kind, not one store call per field.
    let items = join_all(
        projects
            .into_iter()
            .map(|p| resolvers::project_view(&ctx, p)),
    )
    .await;

    (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
}

pub async fn get_project(
    Extension(ctx): Extension<Arc<RequestContext>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ProjectId = match id.parse() {
        Ok(id) => id,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid project id");
        }
    };

    match query::project(&ctx, id).await {
        Some(project) => {
            let view = resolvers::project_view(&ctx, project).await;
            (StatusCode::OK, Json(view)).into_response()
        }
        None => (StatusCode::OK, Json(serde_json::Value::Null)).into_response(),
    }
}

pub async fn create_project(
    Extension(ctx): Extension<Arc<RequestContext>>,
    Json(body): Json<dto::NewProjectRequest>,
) -> axum::response::Response {
    match query::new_project(&ctx, body.into_draft()).await {
        Ok(Some(project)) => {
            let view = resolvers::project_view(&ctx, project).await;
            (StatusCode::CREATED, Json(view)).into_response()
        }
        Ok(None) => (StatusCode::OK, Json(serde_json::Value::Null)).into_response(),
        Err(err) => errors::engine_error_to_response(err),
    }
}
