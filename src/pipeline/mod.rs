//! Rating pipelines.
//!
//! ```text
//! single: metadata -> resolve (cache | live) -> filter -> annotate
//! bulk:   ratings database (one batched read) -> filter -> annotate (per item, concurrent)
//! ```
//!
//! Neither pipeline returns an error. Collaborator failures are logged and
//! the best record built so far is returned.

mod bulk;
mod single;

use std::sync::Arc;

use crate::catalog::RatingsDatabase;
use crate::images::AnnotationCoordinator;
use crate::metadata::MetadataSource;
use crate::ratings::RatingResolver;

/// Wires the collaborators both pipelines need.
pub struct RatingPipeline {
    metadata: Arc<dyn MetadataSource>,
    resolver: RatingResolver,
    coordinator: AnnotationCoordinator,
    ratings_db: Arc<dyn RatingsDatabase>,
}

impl RatingPipeline {
    pub fn new(
        metadata: Arc<dyn MetadataSource>,
        resolver: RatingResolver,
        coordinator: AnnotationCoordinator,
        ratings_db: Arc<dyn RatingsDatabase>,
    ) -> Self {
        Self {
            metadata,
            resolver,
            coordinator,
            ratings_db,
        }
    }

    pub fn metadata(&self) -> &Arc<dyn MetadataSource> {
        &self.metadata
    }
}
