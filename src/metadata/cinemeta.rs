//! Cinemeta-compatible metadata client.
//!
//! Fetches `{base_url}/meta/{type}/{id}.json` and reads the `meta` object's
//! `name`, `poster`, `description` and `year` (or `releaseInfo`) fields.

use std::time::Duration;

use async_trait::async_trait;
use rp_core::config::MetadataConfig;
use rp_core::{Error, MetadataRecord, Result, TitleId};
use serde::Deserialize;
use tracing::{debug, warn};

use super::MetadataSource;

// ---------------------------------------------------------------------------
// Response types (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct MetaResponse {
    meta: Option<Meta>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Meta {
    name: Option<String>,
    poster: Option<String>,
    description: Option<String>,
    year: Option<serde_json::Value>,
    release_info: Option<String>,
}

impl Meta {
    fn year(&self) -> Option<String> {
        match &self.year {
            Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
            Some(serde_json::Value::Number(n)) => Some(n.to_string()),
            _ => self.release_info.clone().filter(|r| !r.trim().is_empty()),
        }
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct CinemetaClient {
    http: reqwest::Client,
    base_url: String,
}

impl CinemetaClient {
    pub fn new(config: &MetadataConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|e| {
                warn!("Failed to build HTTP client with timeout: {}", e);
                reqwest::Client::new()
            });

        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, title_id: &TitleId) -> String {
        format!(
            "{}/meta/{}/{}.json",
            self.base_url,
            title_id.content_type(),
            title_id.id()
        )
    }

    async fn lookup(&self, title_id: &TitleId) -> Result<MetadataRecord> {
        let url = self.url(title_id);
        debug!(url = %url, "Cinemeta get meta");

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::upstream("cinemeta", format!("request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(Error::upstream("cinemeta", format!("HTTP {}", resp.status())));
        }

        let body: MetaResponse = resp
            .json()
            .await
            .map_err(|e| Error::upstream("cinemeta", format!("parse error: {e}")))?;

        let meta = body.meta.ok_or_else(|| Error::not_found("meta", title_id))?;
        let year = meta.year();

        Ok(MetadataRecord {
            id: title_id.id().to_string(),
            content_type: title_id.content_type().clone(),
            name: meta.name.unwrap_or_default(),
            description: meta.description.unwrap_or_default(),
            poster: meta.poster,
            year,
        })
    }
}

#[async_trait]
impl MetadataSource for CinemetaClient {
    fn name(&self) -> &'static str {
        "cinemeta"
    }

    async fn get_metadata(&self, title_id: &TitleId) -> MetadataRecord {
        match self.lookup(title_id).await {
            Ok(record) => record,
            Err(e) => {
                warn!(title_id = %title_id, error = %e, "Metadata lookup failed");
                MetadataRecord::empty(title_id)
            }
        }
    }
}
