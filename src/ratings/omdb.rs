//! OMDb-compatible rating provider client.
//!
//! Implements [`RatingSource`] with one bounded GET per lookup, keyed by the
//! exact title string and optional year. The response is parsed into a typed
//! structure at the boundary and mapped to the canonical providers:
//!
//! | provider          | response field                          |
//! |-------------------|-----------------------------------------|
//! | `imdb`            | `imdbRating`                            |
//! | `metacritic`      | `Metascore`                             |
//! | `rotten_tomatoes` | `Ratings[Source == "Rotten Tomatoes"]`  |

use std::time::Duration;

use async_trait::async_trait;
use rp_core::config::OmdbConfig;
use rp_core::rating::{IMDB, METACRITIC, ROTTEN_TOMATOES};
use rp_core::{normalize, Error, RatingMapping, Result};
use serde::Deserialize;
use tracing::{debug, warn};

use super::RatingSource;

/// The provider's placeholder for a missing score.
const UNAVAILABLE: &str = "N/A";

/// Label of the named third-party aggregate in the `Ratings` list.
const ROTTEN_TOMATOES_SOURCE: &str = "Rotten Tomatoes";

// ---------------------------------------------------------------------------
// OMDb API response types (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct OmdbResponse {
    #[serde(rename = "Response", default)]
    response: String,
    #[serde(rename = "Error")]
    error: Option<String>,
    #[serde(rename = "imdbRating")]
    imdb_rating: Option<String>,
    #[serde(rename = "Metascore")]
    metascore: Option<String>,
    #[serde(rename = "Ratings", default)]
    ratings: Vec<OmdbRating>,
}

#[derive(Debug, Deserialize)]
struct OmdbRating {
    #[serde(rename = "Source")]
    source: String,
    #[serde(rename = "Value")]
    value: String,
}

impl OmdbResponse {
    fn is_success(&self) -> bool {
        self.response.eq_ignore_ascii_case("true")
    }

    /// Map the raw fields to canonical providers, skipping placeholders.
    fn into_mapping(self) -> RatingMapping {
        let mut mapping = RatingMapping::new();

        let rotten = self
            .ratings
            .into_iter()
            .find(|r| r.source == ROTTEN_TOMATOES_SOURCE)
            .map(|r| r.value);

        for (provider, raw) in [
            (IMDB, self.imdb_rating),
            (METACRITIC, self.metascore),
            (ROTTEN_TOMATOES, rotten),
        ] {
            match raw.as_deref().map(str::trim) {
                Some(UNAVAILABLE) | None => {}
                Some(value) => {
                    mapping.insert(provider, normalize(value));
                }
            }
        }

        mapping
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// OMDb rating client.
///
/// Without an API key the client is inert: [`RatingSource::fetch`] returns an
/// empty mapping without touching the network.
pub struct OmdbClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl OmdbClient {
    pub fn new(config: &OmdbConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|e| {
                warn!("Failed to build HTTP client with timeout: {}", e);
                reqwest::Client::new()
            });

        Self {
            http,
            base_url: config.base_url.clone(),
            api_key: config
                .api_key
                .clone()
                .filter(|k| !k.trim().is_empty()),
        }
    }

    async fn request(&self, api_key: &str, title: &str, year: Option<&str>) -> Result<OmdbResponse> {
        let mut params: Vec<(&str, &str)> = vec![("apikey", api_key), ("t", title)];
        if let Some(y) = year.filter(|y| !y.trim().is_empty()) {
            params.push(("y", y));
        }

        let resp = self
            .http
            .get(&self.base_url)
            .query(&params)
            .send()
            .await
            .map_err(|e| Error::upstream("omdb", format!("request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(Error::upstream("omdb", format!("HTTP {}", resp.status())));
        }

        resp.json::<OmdbResponse>()
            .await
            .map_err(|e| Error::upstream("omdb", format!("parse error: {e}")))
    }
}

#[async_trait]
impl RatingSource for OmdbClient {
    fn name(&self) -> &'static str {
        "omdb"
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    async fn fetch(&self, title: &str, year: Option<&str>) -> RatingMapping {
        let Some(api_key) = self.api_key.as_deref() else {
            debug!(title, "No OMDb API key configured; skipping live lookup");
            return RatingMapping::new();
        };

        match self.request(api_key, title, year).await {
            Ok(body) if body.is_success() => {
                let mapping = body.into_mapping();
                debug!(title, year = ?year, providers = mapping.len(), "Fetched live ratings");
                mapping
            }
            Ok(body) => {
                debug!(
                    title,
                    year = ?year,
                    reason = body.error.as_deref().unwrap_or("unknown"),
                    "OMDb reported no result"
                );
                RatingMapping::new()
            }
            Err(e) => {
                warn!(title, year = ?year, error = %e, "Live rating lookup failed");
                RatingMapping::new()
            }
        }
    }
}
