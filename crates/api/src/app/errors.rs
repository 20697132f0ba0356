use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use vitrine_core::DomainError;
use vitrine_engine::EngineError;

/// Map a write-path engine failure onto an HTTP response.
///
/// Caller contract violations come back as 4xx with a stable error code;
/// store failures are 500s — they must never silently turn into `null`.
pub fn engine_error_to_response(err: EngineError) -> axum::response::Response {
    match err {
        EngineError::Domain(DomainError::InvalidScoreComponent(v)) => json_error(
            StatusCode::BAD_REQUEST,
            "invalid_score_component",
            format!("score component {v} is not one of 0..=4"),
        ),
        EngineError::Domain(DomainError::UnknownVoter(id)) => json_error(
            StatusCode::BAD_REQUEST,
            "unknown_voter",
            format!("no user with id {id}"),
        ),
        EngineError::Domain(DomainError::InvalidId(msg)) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_id", msg)
        }
        EngineError::Domain(DomainError::NotFound) => {
            json_error(StatusCode::NOT_FOUND, "not_found", "not found")
        }
        EngineError::Domain(DomainError::Unauthorized) => {
            json_error(StatusCode::FORBIDDEN, "unauthorized", "unauthorized")
        }
        EngineError::Store(e) => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "store_error",
            e.to_string(),
        ),
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
