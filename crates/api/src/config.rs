//! Process configuration from environment variables.

/// Everything the binary needs to come up.
///
/// Secrets fall back to insecure dev defaults so a local checkout runs
/// without ceremony; every fallback is logged at warn.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind address, e.g. `0.0.0.0:8080`.
    pub address: String,
    /// Externally reachable base URL, used to build the OAuth redirect URI.
    pub public_url: String,
    /// Where the browser is sent after the auth flow completes.
    pub frontend_url: String,

    pub jwt_secret: String,
    /// Nonce echoed through the OAuth redirect to bind callback to login.
    pub oauth_state: String,

    pub provider_client_id: String,
    pub provider_client_secret: String,
    pub provider_authorize_url: String,
    pub provider_token_url: String,
    pub provider_user_url: String,

    /// Postgres connection string; absent means the in-memory store.
    pub database_url: Option<String>,
}

const DEFAULT_AUTHORIZE_URL: &str = "https://discordapp.com/api/oauth2/authorize";
const DEFAULT_TOKEN_URL: &str = "https://discordapp.com/api/oauth2/token";
const DEFAULT_USER_URL: &str = "https://discordapp.com/api/users/@me";

impl Config {
    pub fn from_env() -> Self {
        Self {
            address: env_or("VITRINE_ADDRESS", "0.0.0.0:8080"),
            public_url: env_or("VITRINE_PUBLIC_URL", "http://127.0.0.1:8080"),
            frontend_url: env_or("VITRINE_FRONTEND_URL", "http://127.0.0.1:3000/"),
            jwt_secret: secret_or("VITRINE_JWT_SECRET", "dev-secret"),
            oauth_state: secret_or("VITRINE_OAUTH_STATE", "dev-state"),
            provider_client_id: env_or("VITRINE_OAUTH_CLIENT_ID", ""),
            provider_client_secret: env_or("VITRINE_OAUTH_CLIENT_SECRET", ""),
            provider_authorize_url: env_or("VITRINE_OAUTH_AUTHORIZE_URL", DEFAULT_AUTHORIZE_URL),
            provider_token_url: env_or("VITRINE_OAUTH_TOKEN_URL", DEFAULT_TOKEN_URL),
            provider_user_url: env_or("VITRINE_OAUTH_USER_URL", DEFAULT_USER_URL),
            database_url: std::env::var("VITRINE_DATABASE_URL").ok(),
        }
    }

    /// The callback URI registered with the identity provider.
    pub fn redirect_uri(&self) -> String {
        format!("{}/auth/callback", self.public_url.trim_end_matches('/'))
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn secret_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| {
        tracing::warn!("{name} not set; using insecure dev default");
        default.to_string()
    })
}
