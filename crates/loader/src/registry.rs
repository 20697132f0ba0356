//! Per-request loader construction.

use std::sync::Arc;

use vitrine_store::Store;

use crate::loader::Loader;
use crate::source::{ProjectSource, RatingSource, UserSource};

/// One fresh loader per entity kind, scoped to a single inbound request.
///
/// Construction is the whole job: build a `Loaders` when a request arrives,
/// keep it inside that request's context, and drop it with the request. No
/// two requests ever share a loader instance, so nothing memoized here can
/// leak across requests.
pub struct Loaders {
    pub users: Loader<UserSource>,
    pub projects: Loader<ProjectSource>,
    pub ratings: Loader<RatingSource>,
}

impl Loaders {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            users: Loader::new(Arc::new(UserSource::new(Arc::clone(&store)))),
            projects: Loader::new(Arc::new(ProjectSource::new(Arc::clone(&store)))),
            ratings: Loader::new(Arc::new(RatingSource::new(store))),
        }
    }
}
