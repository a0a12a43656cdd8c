//! Configuration discovery and collaborator wiring.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rp_core::config::Config;
use rp_core::Result;

use crate::cache::{CacheTier, FallbackStore, RedisStore, SharedStore};
use crate::catalog::SqliteRatingsDb;
use crate::images::{AnnotationCoordinator, BadgeAnnotator, HttpPosterSource};
use crate::metadata::CinemetaClient;
use crate::pipeline::RatingPipeline;
use crate::ratings::{OmdbClient, RatingResolver, RatingSource};

const DEFAULT_CONFIG_PATHS: [&str; 3] = [
    "./ratedposters.toml",
    "~/.config/ratedposters/config.toml",
    "/etc/ratedposters/config.toml",
];

/// Pick the config file to load: `custom` when given, else the first
/// existing default location.
pub fn resolve_config_path(custom: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = custom {
        return Some(path.to_path_buf());
    }
    DEFAULT_CONFIG_PATHS
        .iter()
        .map(|p| PathBuf::from(shellexpand::tilde(p).as_ref()))
        .find(|p| p.exists())
}

/// Load configuration from `custom` or a default location, with
/// environment overrides applied.
pub fn load_config(custom: Option<&Path>) -> Config {
    Config::load_or_default(resolve_config_path(custom).as_deref())
}

/// Everything the binary needs, built from one [`Config`].
pub struct AppContext {
    pub pipeline: RatingPipeline,
    pub ratings_db: Arc<SqliteRatingsDb>,
}

impl AppContext {
    pub fn from_config(config: &Config) -> Result<Self> {
        let shared: Option<Arc<dyn SharedStore>> = match config.cache.redis_url.as_deref() {
            Some(url) => Some(Arc::new(RedisStore::new(url)?)),
            None => None,
        };
        let fallback = Arc::new(FallbackStore::new(config.cache.ttl_secs));
        let cache = Arc::new(CacheTier::new(shared, fallback, &config.cache));

        let omdb = OmdbClient::new(&config.omdb);
        if !omdb.is_available() {
            tracing::warn!("No OMDb API key configured; live rating lookups are disabled");
        }
        let resolver = RatingResolver::new(cache, Arc::new(omdb));

        let coordinator = AnnotationCoordinator::new(
            Arc::new(HttpPosterSource::new(&config.annotation)),
            Arc::new(BadgeAnnotator::new(&config.annotation)),
        );

        let db_path = shellexpand::tilde(&config.database.path.to_string_lossy()).into_owned();
        let ratings_db = Arc::new(SqliteRatingsDb::open(Path::new(&db_path))?);

        let pipeline = RatingPipeline::new(
            Arc::new(CinemetaClient::new(&config.metadata)),
            resolver,
            coordinator,
            ratings_db.clone(),
        );

        Ok(Self {
            pipeline,
            ratings_db,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::RatingsDatabase;

    #[test]
    fn explicit_path_wins() {
        let path = Path::new("/nonexistent/custom.toml");
        assert_eq!(resolve_config_path(Some(path)).as_deref(), Some(path));
    }

    #[tokio::test]
    async fn builds_without_redis() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.cache.redis_url = None;
        config.database.path = dir.path().join("ratings.db");

        let ctx = AppContext::from_config(&config).unwrap();
        let found = ctx.ratings_db.get_ratings_for_ids(&["tt1".into()]).await.unwrap();
        assert!(found.is_empty());
        assert!(config.database.path.exists());
    }

    #[test]
    fn invalid_redis_url_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.cache.redis_url = Some("not a url".into());
        config.database.path = dir.path().join("ratings.db");

        assert!(AppContext::from_config(&config).is_err());
    }
}
