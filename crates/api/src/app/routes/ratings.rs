use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};

use vitrine_core::ProjectId;

use crate::app::{dto, errors, query, resolvers};
use crate::context::RequestContext;

pub fn router() -> Router {
    Router::new().route("/", post(update_rating))
}

pub async fn update_rating(
    Extension(ctx): Extension<Arc<RequestContext>>,
    Json(body): Json<dto::UpdateRatingRequest>,
) -> axum::response::Response {
    let project_id = ProjectId::new(body.project_id);

    match query::update_rating(&ctx, project_id, body.ordinals()).await {
        Ok(Some(rating)) => {
            let view = resolvers::rating_view(&ctx, rating).await;
            (StatusCode::OK, Json(view)).into_response()
        }
        Ok(None) => (StatusCode::OK, Json(serde_json::Value::Null)).into_response(),
        Err(err) => errors::engine_error_to_response(err),
    }
}
