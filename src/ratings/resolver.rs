//! Cache-first rating resolution with write-through on miss.

use std::sync::Arc;

use rp_core::{RatingMapping, TitleId};
use tracing::{debug, info};

use super::RatingSource;
use crate::cache::CacheTier;

/// Resolves the rating mapping for one title.
///
/// A non-empty cache read is returned as-is, even when it only covers some
/// providers. Concurrent misses for the same title each fetch live and each
/// write the cache; the last write wins.
pub struct RatingResolver {
    cache: Arc<CacheTier>,
    source: Arc<dyn RatingSource>,
}

impl RatingResolver {
    pub fn new(cache: Arc<CacheTier>, source: Arc<dyn RatingSource>) -> Self {
        Self { cache, source }
    }

    pub async fn resolve(&self, title_id: &TitleId, title: &str, year: Option<&str>) -> RatingMapping {
        let cached = self.cache.get(title_id.id()).await;
        if !cached.is_empty() {
            debug!(title_id = %title_id, providers = cached.len(), "Resolved ratings from cache");
            return cached;
        }

        let fetched = self.source.fetch(title, year).await;
        if fetched.is_empty() {
            debug!(title_id = %title_id, title, source = self.source.name(), "No ratings available");
            return fetched;
        }

        info!(
            title_id = %title_id,
            title,
            source = self.source.name(),
            providers = fetched.len(),
            "Resolved live ratings"
        );
        self.cache.put(title_id.id(), &fetched).await;
        fetched
    }
}
