//! Two-tier rating cache.
//!
//! ```text
//! get: shared store (any hit short-circuits) -> fallback map -> empty
//! put: shared store (one atomic batch, SET EX per key) | on failure -> fallback map
//! ```
//!
//! Cache failures never fail a resolution. They are logged and at worst
//! force a live fetch.

mod fallback;
mod shared;

pub use fallback::FallbackStore;
pub use shared::{RedisStore, SharedStore};

use std::sync::Arc;

use rp_core::config::CacheConfig;
use rp_core::rating::PROVIDERS;
use rp_core::{normalize, RatingKey, RatingMapping, Result};
use tracing::{debug, warn};

/// Read/write facade over the shared store and the fallback map.
pub struct CacheTier {
    shared: Option<Arc<dyn SharedStore>>,
    fallback: Arc<FallbackStore>,
    ttl_secs: u64,
    schema_version: String,
}

impl CacheTier {
    /// Build a cache tier. `shared` is `None` when no shared store is
    /// configured, in which case every read and write uses the fallback map.
    pub fn new(
        shared: Option<Arc<dyn SharedStore>>,
        fallback: Arc<FallbackStore>,
        config: &CacheConfig,
    ) -> Self {
        Self {
            shared,
            fallback,
            ttl_secs: config.ttl_secs,
            schema_version: config.schema_version.clone(),
        }
    }

    /// Fallback-only tier, used when no shared store is configured.
    pub fn in_process(fallback: Arc<FallbackStore>, config: &CacheConfig) -> Self {
        Self::new(None, fallback, config)
    }

    fn key(&self, title_id: &str, provider: &str) -> String {
        RatingKey::new(title_id, provider, &self.schema_version).to_string()
    }

    /// Read every known provider's score for `title_id`.
    ///
    /// Returns whatever subset is cached, possibly nothing. A non-empty
    /// result from the shared store is returned without consulting the
    /// fallback map.
    pub async fn get(&self, title_id: &str) -> RatingMapping {
        if let Some(store) = self.ready_store().await {
            match self.read_shared(store, title_id).await {
                Ok(mapping) if !mapping.is_empty() => {
                    debug!(title_id, store = store.name(), hits = mapping.len(), "Shared cache hit");
                    return mapping;
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(title_id, error = %e, "Shared cache read failed; using fallback map");
                }
            }
        }

        let mapping = self.read_fallback(title_id);
        if !mapping.is_empty() {
            debug!(title_id, hits = mapping.len(), "Fallback cache hit");
        }
        mapping
    }

    /// Write every score in `mapping` for `title_id`.
    ///
    /// All keys go to the shared store in one all-or-nothing batch when it is
    /// reachable; if the batch fails, all keys are written to the fallback
    /// map instead. One call never lands in both tiers.
    pub async fn put(&self, title_id: &str, mapping: &RatingMapping) {
        if mapping.is_empty() {
            return;
        }

        if let Some(store) = self.ready_store().await {
            match self.write_shared(store, title_id, mapping).await {
                Ok(()) => {
                    debug!(title_id, store = store.name(), keys = mapping.len(), "Cached ratings");
                    return;
                }
                Err(e) => {
                    warn!(title_id, error = %e, "Shared cache write failed; using fallback map");
                }
            }
        }

        // the map only grows on this path, so stale entries are dropped here
        self.fallback.cleanup_expired();
        for (provider, value) in mapping.iter() {
            self.fallback.put(self.key(title_id, provider), value.clone());
        }
        debug!(title_id, keys = mapping.len(), "Cached ratings in fallback map");
    }

    /// The shared store, opened if necessary. `None` when unconfigured or
    /// the connection cannot be established.
    async fn ready_store(&self) -> Option<&dyn SharedStore> {
        let store = self.shared.as_deref()?;
        if !store.is_open() {
            if let Err(e) = store.open().await {
                debug!(store = store.name(), error = %e, "Shared cache unavailable");
                return None;
            }
        }
        Some(store)
    }

    async fn read_shared(&self, store: &dyn SharedStore, title_id: &str) -> Result<RatingMapping> {
        let mut mapping = RatingMapping::new();
        for provider in PROVIDERS {
            if let Some(raw) = store.get(&self.key(title_id, provider)).await? {
                mapping.insert(provider, normalize(&raw));
            }
        }
        Ok(mapping)
    }

    async fn write_shared(
        &self,
        store: &dyn SharedStore,
        title_id: &str,
        mapping: &RatingMapping,
    ) -> Result<()> {
        let entries: Vec<(String, String)> = mapping
            .iter()
            .map(|(provider, value)| (self.key(title_id, provider), value.as_str().to_string()))
            .collect();
        store.set_many(&entries, self.ttl_secs).await
    }

    fn read_fallback(&self, title_id: &str) -> RatingMapping {
        let mut mapping = RatingMapping::new();
        for provider in PROVIDERS {
            if let Some(value) = self.fallback.get(&self.key(title_id, provider)) {
                mapping.insert(provider, value);
            }
        }
        mapping
    }
}
