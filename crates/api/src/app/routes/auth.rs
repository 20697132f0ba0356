//! Identity-provider login flow and session introspection.
//!
//! `/auth/login` bounces the browser to the provider; `/auth/callback`
//! exchanges the returned code for an access token, fetches the verified
//! profile, creates the user row if this is a first login, and hands the
//! browser a signed JWT cookie.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Redirect},
    routing::get,
};
use chrono::{Duration, Utc};
use serde::Deserialize;

use vitrine_core::UserId;
use vitrine_model::IdentityProfile;

use crate::app::{AppServices, dto, errors};
use crate::context::RequestContext;

const SESSION_TTL_SECONDS: i64 = 3600;

pub fn router() -> Router {
    Router::new()
        .route("/login", get(login))
        .route("/callback", get(callback))
        .route("/me", get(me))
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    let cfg = &services.config;
    let redirect_uri = cfg.redirect_uri();
    let url = reqwest::Url::parse_with_params(
        &cfg.provider_authorize_url,
        &[
            ("client_id", cfg.provider_client_id.as_str()),
            ("redirect_uri", redirect_uri.as_str()),
            ("response_type", "code"),
            ("scope", "identify"),
            ("state", cfg.oauth_state.as_str()),
        ],
    );

    match url {
        Ok(url) => Redirect::temporary(url.as_str()).into_response(),
        Err(err) => {
            tracing::error!(error = %err, "authorize url misconfigured");
            errors::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "misconfigured",
                "authorize url misconfigured",
            )
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub state: String,
    pub code: String,
}

pub async fn callback(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<Arc<RequestContext>>,
    Query(params): Query<CallbackParams>,
) -> axum::response::Response {
    let cfg = &services.config;

    if params.state != cfg.oauth_state {
        tracing::warn!("state mismatch in auth callback");
        return errors::json_error(StatusCode::BAD_REQUEST, "state_mismatch", "state mismatch");
    }

    let access_token = match exchange_code(&services, &params.code).await {
        Ok(token) => token,
        Err(err) => {
            tracing::warn!(error = %err, "code exchange failed");
            return errors::json_error(StatusCode::BAD_GATEWAY, "exchange_failed", err.to_string());
        }
    };

    let profile = match fetch_profile(&services, &access_token).await {
        Ok(profile) => profile,
        Err(err) => {
            tracing::warn!(error = %err, "profile fetch failed");
            return errors::json_error(StatusCode::BAD_GATEWAY, "profile_failed", err.to_string());
        }
    };

    if let Err(err) = ctx.store.create_user_if_absent(&profile).await {
        tracing::error!(error = %err, user = %profile.id, "user creation failed");
        return errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", err.to_string());
    }

    let expires_at = Utc::now() + Duration::seconds(SESSION_TTL_SECONDS);
    let token = match services.jwt.issue(&profile, expires_at) {
        Ok(token) => token,
        Err(err) => {
            tracing::error!(error = %err, user = %profile.id, "token issuance failed");
            return errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "token_error", err.to_string());
        }
    };

    tracing::info!(user = %profile.id, "login complete");

    let cookie = format!("jwt={token}; Path=/; Max-Age={SESSION_TTL_SECONDS}");
    (
        StatusCode::SEE_OTHER,
        [
            (header::SET_COOKIE, cookie),
            (header::LOCATION, cfg.frontend_url.clone()),
        ],
    )
        .into_response()
}

/// Session introspection for the frontend: the `(authorized, user)` pair.
pub async fn me(
    Extension(ctx): Extension<Arc<RequestContext>>,
) -> axum::response::Response {
    let user = match ctx.auth.user_id() {
        Some(id) => ctx.loaders.users.load(id.clone()).await,
        None => None,
    };

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "authorized": ctx.auth.is_authorized(),
            "user": user.as_ref().map(dto::user_view),
        })),
    )
        .into_response()
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

async fn exchange_code(services: &AppServices, code: &str) -> anyhow::Result<String> {
    let cfg = &services.config;
    let redirect_uri = cfg.redirect_uri();
    let form = [
        ("client_id", cfg.provider_client_id.as_str()),
        ("client_secret", cfg.provider_client_secret.as_str()),
        ("grant_type", "authorization_code"),
        ("code", code),
        ("redirect_uri", redirect_uri.as_str()),
        ("scope", "identify"),
    ];

    let response = services
        .http
        .post(&cfg.provider_token_url)
        .form(&form)
        .send()
        .await?
        .error_for_status()?;

    let token: TokenResponse = response.json().await?;
    Ok(token.access_token)
}

async fn fetch_profile(services: &AppServices, access_token: &str) -> anyhow::Result<IdentityProfile> {
    let raw: serde_json::Value = services
        .http
        .get(&services.config.provider_user_url)
        .bearer_auth(access_token)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    let id = str_field(&raw, "id");
    if id.is_empty() {
        anyhow::bail!("provider profile has no id");
    }

    Ok(IdentityProfile {
        id: UserId::new(id),
        username: str_field(&raw, "username"),
        avatar: str_field(&raw, "avatar"),
        discriminator: str_field(&raw, "discriminator"),
        email: raw
            .get("email")
            .and_then(|v| v.as_str())
            .map(str::to_string),
    })
}

fn str_field(raw: &serde_json::Value, key: &str) -> String {
    raw.get(key)
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string()
}
