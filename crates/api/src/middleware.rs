//! Request middleware: context construction and access logging.

use std::sync::Arc;

use axum::{
    extract::State,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use vitrine_auth::JwtProvider;
use vitrine_store::Store;

use crate::context::{AuthContext, RequestContext};

#[derive(Clone)]
pub struct ContextState {
    pub store: Arc<dyn Store>,
    pub jwt: JwtProvider,
}

/// Build the per-request context: derive the `(authorized, user_id)` pair
/// from the presented token and attach fresh loaders.
///
/// Token problems do not fail the request. The query surface resolves
/// unauthenticated mutations to `null`, so this layer only records the
/// outcome and lets the request continue anonymously.
pub async fn context_middleware(
    State(state): State<ContextState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let auth = match presented_token(req.headers()) {
        Some(token) => match state.jwt.authorize(&token) {
            Ok(user_id) => AuthContext::authorized(user_id),
            Err(err) => {
                tracing::debug!(error = %err, "rejected bearer token");
                AuthContext::anonymous()
            }
        },
        None => AuthContext::anonymous(),
    };

    let ctx = RequestContext::new(Arc::clone(&state.store), auth);
    req.extensions_mut().insert(Arc::new(ctx));

    next.run(req).await
}

/// Access log with a correlation id per request.
pub async fn request_log(
    req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let request_id = Uuid::now_v7();
    let method = req.method().clone();
    let uri = req.uri().clone();
    let started = std::time::Instant::now();

    let response = next.run(req).await;

    tracing::info!(
        %request_id,
        %method,
        %uri,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request"
    );
    response
}

/// The bearer token from the `Authorization` header, or the `jwt` cookie the
/// auth callback sets for browser clients.
fn presented_token(headers: &HeaderMap) -> Option<String> {
    if let Some(header) = headers.get(axum::http::header::AUTHORIZATION) {
        if let Ok(value) = header.to_str() {
            if let Some(token) = value.strip_prefix("Bearer ") {
                let token = token.trim();
                if !token.is_empty() {
                    return Some(token.to_string());
                }
            }
        }
    }

    let cookies = headers.get(axum::http::header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == "jwt" && !value.is_empty()).then(|| value.to_string())
    })
}

#[cfg(test)]
mod tests {
    use axum::http::header::{AUTHORIZATION, COOKIE};

    use super::*;

    #[test]
    fn bearer_header_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, "Bearer abc".parse().unwrap());
        headers.insert(COOKIE, "jwt=def; theme=dark".parse().unwrap());
        assert_eq!(presented_token(&headers).as_deref(), Some("abc"));
    }

    #[test]
    fn jwt_cookie_is_accepted() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, "theme=dark; jwt=def".parse().unwrap());
        assert_eq!(presented_token(&headers).as_deref(), Some("def"));
    }

    #[test]
    fn empty_or_malformed_credentials_are_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, "Bearer ".parse().unwrap());
        assert_eq!(presented_token(&headers), None);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, "Basic abc".parse().unwrap());
        assert_eq!(presented_token(&headers), None);
    }
}
