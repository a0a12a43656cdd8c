//! Canonical metadata lookup.
//!
//! This module defines the [`MetadataSource`] trait the pipelines use to
//! obtain a [`MetadataRecord`] for a title, and a Cinemeta-compatible
//! implementation.
//!
//! # Module layout
//!
//! - [`cinemeta`] -- HTTP client for a Cinemeta-style `meta` endpoint.

pub mod cinemeta;

use async_trait::async_trait;
use rp_core::{MetadataRecord, TitleId};

pub use cinemeta::CinemetaClient;

/// Async trait for the canonical metadata service.
///
/// Lookups never fail: on any error the implementation logs and returns
/// [`MetadataRecord::empty`], and callers treat an empty name as "nothing to
/// rate".
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Short, lowercase identifier for this source (e.g. `"cinemeta"`).
    fn name(&self) -> &'static str;

    async fn get_metadata(&self, title_id: &TitleId) -> MetadataRecord;
}
