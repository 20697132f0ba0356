//! `vitrine-auth` — bearer-token boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: it turns an
//! identity profile into a signed token and a presented token back into a
//! user id. Everything else (cookie plumbing, the OAuth exchange itself)
//! lives at the API layer.

pub mod claims;
pub mod token;

pub use claims::Claims;
pub use token::{JwtProvider, TokenError};
