//! JWT claims model.

use serde::{Deserialize, Serialize};

/// The claims carried by an issued bearer token.
///
/// `jti` holds the provider identity id — the only claim the query surface
/// actually depends on. The display fields ride along so a client can render
/// the session without another round trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub avatar: String,
    pub discriminator: String,
    pub username: String,

    /// Subject identity: the user's provider-issued id.
    pub jti: String,

    /// Expiry, seconds since the epoch.
    pub exp: i64,
}
