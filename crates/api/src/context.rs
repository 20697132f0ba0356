//! Request-scoped context.
//!
//! One `RequestContext` is built per inbound request and carries everything
//! resolution needs: the store handle, one fresh loader per entity kind, and
//! the authorization pair derived from the bearer token. Passing this by
//! parameter replaces the source system's untyped context bag.

use std::sync::Arc;

use vitrine_core::UserId;
use vitrine_loader::Loaders;
use vitrine_store::Store;

/// The `(authorized, user_id)` pair the token layer derives for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    user_id: Option<UserId>,
}

impl AuthContext {
    pub fn anonymous() -> Self {
        Self { user_id: None }
    }

    pub fn authorized(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
        }
    }

    pub fn is_authorized(&self) -> bool {
        self.user_id.is_some()
    }

    pub fn user_id(&self) -> Option<&UserId> {
        self.user_id.as_ref()
    }
}

/// Per-request state; never shared across requests.
pub struct RequestContext {
    pub store: Arc<dyn Store>,
    pub loaders: Loaders,
    pub auth: AuthContext,
}

impl RequestContext {
    pub fn new(store: Arc<dyn Store>, auth: AuthContext) -> Self {
        let loaders = Loaders::new(Arc::clone(&store));
        Self {
            store,
            loaders,
            auth,
        }
    }
}
