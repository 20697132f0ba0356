//! The verified profile tuple handed over by the identity provider.

use serde::{Deserialize, Serialize};

use vitrine_core::UserId;

/// What the provider tells us about an account after a successful exchange.
///
/// This is the system's only dependency on the provider: a user row is
/// created from (or reconciled against) this shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityProfile {
    pub id: UserId,
    pub username: String,
    pub avatar: String,
    pub discriminator: String,
    pub email: Option<String>,
}
