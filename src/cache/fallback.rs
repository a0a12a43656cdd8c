//! In-process fallback tier.
//!
//! Holds scores keyed by their full rating key with the time they were
//! stored. Expiry is lazy: stale entries read as absent but stay in the map
//! until overwritten or [`FallbackStore::cleanup_expired`] runs.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use rp_core::RatingValue;

/// Entry in the fallback cache.
#[derive(Debug, Clone)]
struct CacheEntry {
    value: RatingValue,
    stored_at: DateTime<Utc>,
}

/// Process-wide fallback map shared by handle (`Arc<FallbackStore>`).
///
/// Constructed once at startup and never reset; tests build a fresh instance
/// per case.
#[derive(Debug)]
pub struct FallbackStore {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
}

impl FallbackStore {
    /// Create a new fallback store with the given retention window.
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            entries: DashMap::new(),
            ttl: Duration::seconds(ttl_secs.min(i32::MAX as u64) as i64),
        }
    }

    /// Return the value for `key` if it is younger than the retention window.
    pub fn get(&self, key: &str) -> Option<RatingValue> {
        let entry = self.entries.get(key)?;
        if Utc::now().signed_duration_since(entry.stored_at) < self.ttl {
            Some(entry.value.clone())
        } else {
            None
        }
    }

    /// Store `value` under `key`, stamped with the current time.
    pub fn put(&self, key: impl Into<String>, value: RatingValue) {
        self.put_at(key, value, Utc::now());
    }

    /// Store `value` under `key` with an explicit timestamp.
    pub fn put_at(&self, key: impl Into<String>, value: RatingValue, stored_at: DateTime<Utc>) {
        self.entries.insert(key.into(), CacheEntry { value, stored_at });
    }

    /// Number of entries held, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every expired entry.
    pub fn cleanup_expired(&self) {
        let now = Utc::now();
        self.entries
            .retain(|_, entry| now.signed_duration_since(entry.stored_at) < self.ttl);
    }
}

impl Default for FallbackStore {
    fn default() -> Self {
        // 24 hour retention
        Self::new(86_400)
    }
}
