//! HS512 token issuance and validation.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;

use vitrine_core::UserId;
use vitrine_model::IdentityProfile;

use crate::claims::Claims;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token encoding failed: {0}")]
    Encode(String),

    /// Covers bad signatures, wrong algorithms and expired tokens alike; the
    /// middleware treats them all as "not authorized".
    #[error("token rejected: {0}")]
    Invalid(String),

    #[error("token carries no subject id")]
    MissingSubject,
}

/// Issues and validates the site's bearer tokens.
#[derive(Debug, Clone)]
pub struct JwtProvider {
    secret: String,
}

impl JwtProvider {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Sign a token binding the profile's identity id to an expiry.
    pub fn issue(
        &self,
        profile: &IdentityProfile,
        expires_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = Claims {
            avatar: profile.avatar.clone(),
            discriminator: profile.discriminator.clone(),
            username: profile.username.clone(),
            jti: profile.id.to_string(),
            exp: expires_at.timestamp(),
        };

        encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| TokenError::Encode(e.to_string()))
    }

    /// Validate a presented token and extract its claims.
    ///
    /// Only HS512 is accepted; expiry is enforced during decoding.
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::new(Algorithm::HS512),
        )
        .map_err(|e| TokenError::Invalid(e.to_string()))?;

        if data.claims.jti.is_empty() {
            return Err(TokenError::MissingSubject);
        }
        Ok(data.claims)
    }

    /// Convenience for the middleware: token in, authorized user id out.
    pub fn authorize(&self, token: &str) -> Result<UserId, TokenError> {
        let claims = self.validate(token)?;
        Ok(UserId::new(claims.jti))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn profile() -> IdentityProfile {
        IdentityProfile {
            id: UserId::new("190625"),
            username: "alice".to_string(),
            avatar: "abc".to_string(),
            discriminator: "0001".to_string(),
            email: Some("alice@example.com".to_string()),
        }
    }

    #[test]
    fn issued_tokens_round_trip() {
        let provider = JwtProvider::new("secret");
        let token = provider.issue(&profile(), Utc::now() + Duration::hours(1)).unwrap();

        let claims = provider.validate(&token).unwrap();
        assert_eq!(claims.jti, "190625");
        assert_eq!(claims.username, "alice");

        assert_eq!(provider.authorize(&token).unwrap(), UserId::new("190625"));
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let provider = JwtProvider::new("secret");
        let token = provider.issue(&profile(), Utc::now() - Duration::hours(1)).unwrap();

        assert!(matches!(provider.validate(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn tokens_signed_with_another_secret_are_rejected() {
        let provider = JwtProvider::new("secret");
        let other = JwtProvider::new("other-secret");
        let token = other.issue(&profile(), Utc::now() + Duration::hours(1)).unwrap();

        assert!(provider.validate(&token).is_err());
    }
}
