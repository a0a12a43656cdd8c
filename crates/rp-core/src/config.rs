//! Application configuration types.
//!
//! The top-level [`Config`] struct is deserialized from TOML and carries the
//! settings for every collaborator. Every section defaults sensibly so an
//! empty file is valid. Secrets can be supplied through the environment.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::rating::SCHEMA_VERSION;
use crate::Error;

/// Environment variable holding the rating provider API key.
pub const OMDB_API_KEY_ENV: &str = "OMDB_API_KEY";
/// Environment variable holding the shared cache URL.
pub const REDIS_URL_ENV: &str = "REDIS_URL";

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub omdb: OmdbConfig,
    pub metadata: MetadataConfig,
    pub cache: CacheConfig,
    pub database: DatabaseConfig,
    pub annotation: AnnotationConfig,
}

impl Config {
    /// Deserialize a `Config` from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).map_err(|e| Error::Validation(format!("config parse error: {e}")))
    }

    /// Load configuration from a file path, falling back to defaults if the
    /// path is `None` or the file does not exist. Environment overrides are
    /// applied afterwards in every case.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let mut config = match path {
            None => Self::default(),
            Some(path) => match std::fs::read_to_string(path) {
                Ok(contents) => Self::from_toml(&contents).unwrap_or_else(|e| {
                    tracing::warn!("Failed to parse config file {}: {e}", path.display());
                    Self::default()
                }),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    tracing::info!("No config file at {}; using defaults", path.display());
                    Self::default()
                }
                Err(e) => {
                    tracing::warn!("Failed to read config file {}: {e}", path.display());
                    Self::default()
                }
            },
        };
        config.apply_env_overrides();
        config
    }

    /// Overlay secrets and endpoints from the process environment.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var(OMDB_API_KEY_ENV) {
            if !key.trim().is_empty() {
                self.omdb.api_key = Some(key);
            }
        }
        if let Ok(url) = std::env::var(REDIS_URL_ENV) {
            if !url.trim().is_empty() {
                self.cache.redis_url = Some(url);
            }
        }
    }

    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.omdb.api_key.as_deref().map_or(true, |k| k.trim().is_empty()) {
            warnings.push(format!(
                "omdb.api_key is not set (nor {OMDB_API_KEY_ENV}); live rating lookups are disabled"
            ));
        }
        if self.omdb.timeout_secs == 0 {
            warnings.push("omdb.timeout_secs is 0; requests will time out immediately".into());
        }
        if self.cache.redis_url.is_none() {
            warnings.push("cache.redis_url is not set; using the in-process cache only".into());
        }
        if self.cache.ttl_secs == 0 {
            warnings.push("cache.ttl_secs is 0; cached ratings expire immediately".into());
        }
        if self.cache.schema_version.trim().is_empty() {
            warnings.push("cache.schema_version is empty".into());
        }
        if self.annotation.bar_height == 0 {
            warnings.push("annotation.bar_height is 0; rating bars will be invisible".into());
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// Rating provider (OMDb-compatible) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OmdbConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for OmdbConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://www.omdbapi.com/".into(),
            timeout_secs: 5,
        }
    }
}

/// Canonical metadata lookup service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            base_url: "https://v3-cinemeta.strem.io".into(),
            timeout_secs: 10,
        }
    }
}

/// Two-tier rating cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Shared store URL (e.g. `redis://127.0.0.1:6379`). `None` keeps the
    /// cache in-process only.
    pub redis_url: Option<String>,
    /// Retention window in seconds for both tiers.
    pub ttl_secs: u64,
    pub schema_version: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            redis_url: None,
            ttl_secs: 86_400,
            schema_version: SCHEMA_VERSION.into(),
        }
    }
}

/// Persistent ratings database settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("ratings.db"),
        }
    }
}

/// Poster annotation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationConfig {
    /// Height in pixels of each rating bar.
    pub bar_height: u32,
    /// Gap in pixels around and between bars.
    pub padding: u32,
    pub timeout_secs: u64,
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            bar_height: 12,
            padding: 4,
            timeout_secs: 10,
        }
    }
}
