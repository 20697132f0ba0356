use std::sync::Arc;

use axum::{Json, Router, routing::get, routing::post};
use chrono::{Duration as ChronoDuration, Utc};
use reqwest::StatusCode;
use serde_json::json;

use vitrine_api::app::build_app;
use vitrine_api::config::Config;
use vitrine_auth::JwtProvider;
use vitrine_core::UserId;
use vitrine_model::IdentityProfile;
use vitrine_store::{MemoryStore, Store};

const JWT_SECRET: &str = "test-secret";
const OAUTH_STATE: &str = "test-state";

struct TestServer {
    base_url: String,
    store: Arc<MemoryStore>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Build the app (same router as prod) against a fresh in-memory store
    /// and bind it to an ephemeral port.
    async fn spawn(config: Config) -> Self {
        let store = Arc::new(MemoryStore::new());
        let app = build_app(store.clone() as Arc<dyn Store>, config);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            store,
            handle,
        }
    }

    async fn seed_user(&self, id: &str, username: &str) {
        self.store
            .create_user_if_absent(&IdentityProfile {
                id: UserId::new(id),
                username: username.to_string(),
                avatar: String::new(),
                discriminator: "0001".to_string(),
                email: None,
            })
            .await
            .unwrap();
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn test_config() -> Config {
    Config {
        address: "127.0.0.1:0".to_string(),
        public_url: "http://127.0.0.1:0".to_string(),
        frontend_url: "http://127.0.0.1:3000/".to_string(),
        jwt_secret: JWT_SECRET.to_string(),
        oauth_state: OAUTH_STATE.to_string(),
        provider_client_id: "client-id".to_string(),
        provider_client_secret: "client-secret".to_string(),
        provider_authorize_url: "http://127.0.0.1:1/authorize".to_string(),
        provider_token_url: "http://127.0.0.1:1/token".to_string(),
        provider_user_url: "http://127.0.0.1:1/user".to_string(),
        database_url: None,
    }
}

fn mint_jwt(user_id: &str, username: &str) -> String {
    let profile = IdentityProfile {
        id: UserId::new(user_id),
        username: username.to_string(),
        avatar: String::new(),
        discriminator: "0001".to_string(),
        email: None,
    };
    JwtProvider::new(JWT_SECRET)
        .issue(&profile, Utc::now() + ChronoDuration::minutes(10))
        .expect("failed to mint jwt")
}

fn vote_body(project_id: i64, ordinal: i64) -> serde_json::Value {
    json!({
        "project_id": project_id,
        "design": ordinal,
        "performance": ordinal,
        "ease_of_use": ordinal,
        "responsiveness": ordinal,
        "motion": ordinal,
    })
}

#[tokio::test]
async fn health_probe_is_open() {
    let srv = TestServer::spawn(test_config()).await;

    let res = reqwest::get(format!("{}/health", srv.base_url)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn unauthenticated_mutations_resolve_to_null() {
    let srv = TestServer::spawn(test_config()).await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/projects", srv.base_url))
        .json(&json!({
            "link": "https://example.com",
            "github": "a/b",
            "description": "demo",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<serde_json::Value>().await.unwrap(), json!(null));

    let res = client
        .post(format!("{}/ratings", srv.base_url))
        .json(&vote_body(1, 4))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<serde_json::Value>().await.unwrap(), json!(null));

    // Nothing was created.
    let res = client
        .get(format!("{}/projects", srv.base_url))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["items"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn project_and_voting_end_to_end() {
    let srv = TestServer::spawn(test_config()).await;
    srv.seed_user("user-a", "alice").await;
    srv.seed_user("user-b", "bob").await;

    let client = reqwest::Client::new();
    let token_a = mint_jwt("user-a", "alice");
    let token_b = mint_jwt("user-b", "bob");

    // Alice submits her project.
    let res = client
        .post(format!("{}/projects", srv.base_url))
        .bearer_auth(&token_a)
        .json(&json!({
            "link": "https://example.com",
            "github": "alice/app",
            "description": "demo",
            "team": ["user-b"],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let project: serde_json::Value = res.json().await.unwrap();
    let project_id = project["id"].as_i64().unwrap();
    assert_eq!(project["owner"]["id"], "user-a");
    assert_eq!(project["team"][0]["id"], "user-b");
    assert_eq!(project["ratings"].as_array().unwrap().len(), 0);

    // Bob votes top marks.
    let res = client
        .post(format!("{}/ratings", srv.base_url))
        .bearer_auth(&token_b)
        .json(&vote_body(project_id, 4))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let rating: serde_json::Value = res.json().await.unwrap();
    let rating_id = rating["id"].as_i64().unwrap();
    assert_eq!(rating["design"], 100);
    assert_eq!(rating["owner"]["id"], "user-b");

    // The project aggregate reflects the single vote.
    let res = client
        .get(format!("{}/projects/{}", srv.base_url, project_id))
        .send()
        .await
        .unwrap();
    let view: serde_json::Value = res.json().await.unwrap();
    assert_eq!(view["rating"]["design"], 100);
    assert_eq!(view["rating"]["motion"], 100);
    assert_eq!(view["ratings"].as_array().unwrap().len(), 1);
    assert_eq!(view["ratings"][0]["owner"]["id"], "user-b");

    // Bob changes his mind: same rating row, recomputed aggregate.
    let res = client
        .post(format!("{}/ratings", srv.base_url))
        .bearer_auth(&token_b)
        .json(&vote_body(project_id, 0))
        .send()
        .await
        .unwrap();
    let revote: serde_json::Value = res.json().await.unwrap();
    assert_eq!(revote["id"].as_i64().unwrap(), rating_id);
    assert_eq!(revote["design"], 0);

    let res = client
        .get(format!("{}/projects/{}", srv.base_url, project_id))
        .send()
        .await
        .unwrap();
    let view: serde_json::Value = res.json().await.unwrap();
    assert_eq!(view["rating"]["design"], 0);
    assert_eq!(view["ratings"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn aggregate_means_truncate() {
    let srv = TestServer::spawn(test_config()).await;
    srv.seed_user("owner", "olivia").await;
    srv.seed_user("v1", "one").await;
    srv.seed_user("v2", "two").await;

    let client = reqwest::Client::new();
    let res = client
        .post(format!("{}/projects", srv.base_url))
        .bearer_auth(mint_jwt("owner", "olivia"))
        .json(&json!({"link": "l", "github": "g", "description": "d"}))
        .send()
        .await
        .unwrap();
    let project_id = res.json::<serde_json::Value>().await.unwrap()["id"]
        .as_i64()
        .unwrap();

    // Ordinals 0 and 1 map to 0 and 25; mean truncates to 12.
    for (user, ordinal) in [("v1", 0), ("v2", 1)] {
        let res = client
            .post(format!("{}/ratings", srv.base_url))
            .bearer_auth(mint_jwt(user, user))
            .json(&vote_body(project_id, ordinal))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    let view: serde_json::Value = client
        .get(format!("{}/projects/{}", srv.base_url, project_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(view["rating"]["design"], 12);
    assert_eq!(view["ratings"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn resubmission_replaces_the_project() {
    let srv = TestServer::spawn(test_config()).await;
    srv.seed_user("user-a", "alice").await;

    let client = reqwest::Client::new();
    let token = mint_jwt("user-a", "alice");

    let first_id = client
        .post(format!("{}/projects", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({"link": "l", "github": "g", "description": "first"}))
        .send()
        .await
        .unwrap()
        .json::<serde_json::Value>()
        .await
        .unwrap()["id"]
        .as_i64()
        .unwrap();

    let second_id = client
        .post(format!("{}/projects", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({"link": "l", "github": "g", "description": "second"}))
        .send()
        .await
        .unwrap()
        .json::<serde_json::Value>()
        .await
        .unwrap()["id"]
        .as_i64()
        .unwrap();

    assert_ne!(first_id, second_id);

    // The old project is gone; the user points at the replacement.
    let res = client
        .get(format!("{}/projects/{}", srv.base_url, first_id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.json::<serde_json::Value>().await.unwrap(), json!(null));

    let profile: serde_json::Value = client
        .get(format!("{}/users/user-a", srv.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(profile["project"]["id"].as_i64().unwrap(), second_id);
    assert_eq!(profile["project"]["description"], "second");
}

#[tokio::test]
async fn out_of_range_ordinals_are_rejected() {
    let srv = TestServer::spawn(test_config()).await;
    srv.seed_user("user-a", "alice").await;
    srv.seed_user("user-b", "bob").await;

    let client = reqwest::Client::new();
    let project_id = client
        .post(format!("{}/projects", srv.base_url))
        .bearer_auth(mint_jwt("user-a", "alice"))
        .json(&json!({"link": "l", "github": "g", "description": "d"}))
        .send()
        .await
        .unwrap()
        .json::<serde_json::Value>()
        .await
        .unwrap()["id"]
        .as_i64()
        .unwrap();

    let res = client
        .post(format!("{}/ratings", srv.base_url))
        .bearer_auth(mint_jwt("user-b", "bob"))
        .json(&vote_body(project_id, 9))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_score_component");

    // Nothing was recorded.
    let view: serde_json::Value = client
        .get(format!("{}/projects/{}", srv.base_url, project_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(view["ratings"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn votes_with_tokens_for_unknown_users_are_rejected() {
    let srv = TestServer::spawn(test_config()).await;
    srv.seed_user("user-a", "alice").await;

    let client = reqwest::Client::new();
    let project_id = client
        .post(format!("{}/projects", srv.base_url))
        .bearer_auth(mint_jwt("user-a", "alice"))
        .json(&json!({"link": "l", "github": "g", "description": "d"}))
        .send()
        .await
        .unwrap()
        .json::<serde_json::Value>()
        .await
        .unwrap()["id"]
        .as_i64()
        .unwrap();

    // Valid signature, but no backing user row.
    let res = client
        .post(format!("{}/ratings", srv.base_url))
        .bearer_auth(mint_jwt("ghost", "ghost"))
        .json(&vote_body(project_id, 4))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "unknown_voter");
}

/// A minimal identity provider double: token endpoint + user-info endpoint.
async fn spawn_stub_provider() -> String {
    let app = Router::new()
        .route(
            "/token",
            post(|| async {
                Json(json!({
                    "access_token": "stub-access-token",
                    "token_type": "Bearer",
                }))
            }),
        )
        .route(
            "/user",
            get(|| async {
                Json(json!({
                    "id": "provider-user-1",
                    "username": "carol",
                    "avatar": "av",
                    "discriminator": "0042",
                    "email": "carol@example.com",
                }))
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    base
}

#[tokio::test]
async fn oauth_callback_creates_the_user_and_sets_a_session_cookie() {
    let provider = spawn_stub_provider().await;

    let mut config = test_config();
    config.provider_token_url = format!("{provider}/token");
    config.provider_user_url = format!("{provider}/user");
    let srv = TestServer::spawn(config).await;

    // Don't follow the post-login redirect; we want to inspect it.
    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    let res = client
        .get(format!(
            "{}/auth/callback?state={}&code=any-code",
            srv.base_url, OAUTH_STATE
        ))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    let cookie = res
        .headers()
        .get(reqwest::header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("jwt="));

    // The user row now exists...
    let profile: serde_json::Value = client
        .get(format!("{}/users/provider-user-1", srv.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(profile["username"], "carol");

    // ...and the cookie authenticates follow-up requests.
    let me: serde_json::Value = client
        .get(format!("{}/auth/me", srv.base_url))
        .header(reqwest::header::COOKIE, cookie.split(';').next().unwrap())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(me["authorized"], true);
    assert_eq!(me["user"]["id"], "provider-user-1");
}

#[tokio::test]
async fn state_mismatch_is_rejected() {
    let srv = TestServer::spawn(test_config()).await;

    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    let res = client
        .get(format!(
            "{}/auth/callback?state=wrong&code=any-code",
            srv.base_url
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}
