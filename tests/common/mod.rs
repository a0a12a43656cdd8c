//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`], which points the real HTTP collaborators at a
//! single wiremock server and backs the bulk pipeline with an in-memory
//! ratings database. Shared-store fakes live here too.

#![allow(dead_code)]

use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ratedposters::cache::{CacheTier, FallbackStore, SharedStore};
use ratedposters::catalog::SqliteRatingsDb;
use ratedposters::images::{AnnotationCoordinator, BadgeAnnotator, HttpPosterSource};
use ratedposters::metadata::CinemetaClient;
use ratedposters::pipeline::RatingPipeline;
use ratedposters::ratings::{OmdbClient, RatingResolver};
use rp_core::config::Config;
use rp_core::{Error, RatingMapping, Result};

pub const DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// Pipeline wired against a wiremock server.
pub struct TestHarness {
    pub server: MockServer,
    pub pipeline: RatingPipeline,
    pub fallback: Arc<FallbackStore>,
    pub db: Arc<SqliteRatingsDb>,
}

impl TestHarness {
    /// Harness with an API key and no shared store.
    pub async fn new() -> Self {
        Self::build(Some("test-key"), None).await
    }

    pub async fn with_shared(store: Arc<dyn SharedStore>) -> Self {
        Self::build(Some("test-key"), Some(store)).await
    }

    pub async fn without_api_key() -> Self {
        Self::build(None, None).await
    }

    async fn build(api_key: Option<&str>, shared: Option<Arc<dyn SharedStore>>) -> Self {
        let server = MockServer::start().await;

        let mut config = Config::default();
        config.omdb.api_key = api_key.map(String::from);
        config.omdb.base_url = format!("{}/omdb/", server.uri());
        config.metadata.base_url = format!("{}/cinemeta", server.uri());

        let fallback = Arc::new(FallbackStore::new(config.cache.ttl_secs));
        let cache = Arc::new(CacheTier::new(shared, fallback.clone(), &config.cache));
        let db = Arc::new(SqliteRatingsDb::in_memory().expect("failed to create in-memory db"));

        let pipeline = RatingPipeline::new(
            Arc::new(CinemetaClient::new(&config.metadata)),
            RatingResolver::new(cache, Arc::new(OmdbClient::new(&config.omdb))),
            AnnotationCoordinator::new(
                Arc::new(HttpPosterSource::new(&config.annotation)),
                Arc::new(BadgeAnnotator::new(&config.annotation)),
            ),
            db.clone(),
        );

        Self {
            server,
            pipeline,
            fallback,
            db,
        }
    }

    pub fn poster_url(&self, name: &str) -> String {
        format!("{}/posters/{name}", self.server.uri())
    }

    /// Serve a metadata record for a movie id.
    pub async fn mount_movie(&self, id: &str, name: &str, year: &str, poster: Option<&str>) {
        Mock::given(method("GET"))
            .and(path(format!("/cinemeta/meta/movie/{id}.json")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "meta": {
                    "id": id,
                    "type": "movie",
                    "name": name,
                    "description": format!("About {name}."),
                    "year": year,
                    "poster": poster,
                }
            })))
            .mount(&self.server)
            .await;
    }

    /// Serve an OMDb response for `title`, expecting exactly `calls` requests.
    pub async fn mount_omdb(&self, title: &str, body: serde_json::Value, calls: u64) {
        Mock::given(method("GET"))
            .and(path("/omdb/"))
            .and(query_param("t", title))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(calls)
            .mount(&self.server)
            .await;
    }

    /// Fail the test if the rating provider is called at all.
    pub async fn forbid_omdb(&self) {
        Mock::given(method("GET"))
            .and(path("/omdb/"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&self.server)
            .await;
    }

    pub async fn mount_poster(&self, name: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/posters/{name}")))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "image/png")
                    .set_body_bytes(poster_png(120, 180)),
            )
            .mount(&self.server)
            .await;
    }

    pub async fn seed(&self, entries: &[(&str, &[(&str, &str)])]) {
        let entries = entries
            .iter()
            .map(|(id, pairs)| (id.to_string(), mapping(pairs)))
            .collect();
        self.db.import(entries).await.expect("failed to seed ratings");
    }
}

pub fn mapping(pairs: &[(&str, &str)]) -> RatingMapping {
    pairs.iter().copied().collect()
}

/// Solid white PNG.
pub fn poster_png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]));
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(img)
        .write_to(&mut buf, ImageFormat::Png)
        .expect("failed to encode test poster");
    buf.into_inner()
}

// ---------------------------------------------------------------------------
// Shared store fakes
// ---------------------------------------------------------------------------

/// Always-available in-memory shared store that records expiries.
#[derive(Default)]
pub struct MemoryStore {
    pub values: DashMap<String, String>,
    pub expiries: DashMap<String, u64>,
}

#[async_trait]
impl SharedStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn is_open(&self) -> bool {
        true
    }

    async fn open(&self) -> Result<()> {
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).map(|v| v.value().clone()))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn expire(&self, key: &str, seconds: u64) -> Result<()> {
        self.expiries.insert(key.to_string(), seconds);
        Ok(())
    }

    async fn set_many(&self, entries: &[(String, String)], seconds: u64) -> Result<()> {
        for (key, value) in entries {
            self.values.insert(key.clone(), value.clone());
            self.expiries.insert(key.clone(), seconds);
        }
        Ok(())
    }
}

/// Where a [`FailingStore`] breaks.
#[derive(Clone, Copy)]
pub enum FailureMode {
    /// Every `open` fails.
    Unreachable,
    /// `open` succeeds, every command fails.
    Commands,
}

/// Shared store that never works, counting how often it was tried.
pub struct FailingStore {
    mode: FailureMode,
    pub open_attempts: AtomicUsize,
    pub commands: AtomicUsize,
}

impl FailingStore {
    pub fn new(mode: FailureMode) -> Arc<Self> {
        Arc::new(Self {
            mode,
            open_attempts: AtomicUsize::new(0),
            commands: AtomicUsize::new(0),
        })
    }

    fn command(&self) -> Error {
        self.commands.fetch_add(1, Ordering::SeqCst);
        Error::cache("connection reset by peer")
    }
}

#[async_trait]
impl SharedStore for FailingStore {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn is_open(&self) -> bool {
        matches!(self.mode, FailureMode::Commands)
    }

    async fn open(&self) -> Result<()> {
        self.open_attempts.fetch_add(1, Ordering::SeqCst);
        match self.mode {
            FailureMode::Unreachable => Err(Error::cache("connection refused")),
            FailureMode::Commands => Ok(()),
        }
    }

    async fn get(&self, _key: &str) -> Result<Option<String>> {
        Err(self.command())
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<()> {
        Err(self.command())
    }

    async fn expire(&self, _key: &str, _seconds: u64) -> Result<()> {
        Err(self.command())
    }

    async fn set_many(&self, _entries: &[(String, String)], _seconds: u64) -> Result<()> {
        Err(self.command())
    }
}
