//! Persistent title-to-rating database used by bulk catalog requests.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use rp_core::{Error, RatingMapping, Result};
use rp_db::pool::{self, DbPool};
use rp_db::queries::ratings;
use tracing::info;

/// Batched rating lookup for catalog pages.
#[async_trait]
pub trait RatingsDatabase: Send + Sync {
    /// Map each id with stored ratings to its mapping. Ids with nothing
    /// stored are absent from the result.
    async fn get_ratings_for_ids(&self, ids: &[String]) -> Result<HashMap<String, RatingMapping>>;
}

/// [`RatingsDatabase`] backed by the rp-db SQLite pool.
#[derive(Clone)]
pub struct SqliteRatingsDb {
    pool: DbPool,
}

impl SqliteRatingsDb {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Open (creating and migrating if needed) the database at `path`.
    /// Missing parent directories are created.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let path = path
            .to_str()
            .ok_or_else(|| Error::Validation(format!("non UTF-8 database path: {}", path.display())))?;
        Ok(Self::new(pool::init_pool(path)?))
    }

    pub fn in_memory() -> Result<Self> {
        Ok(Self::new(pool::init_memory_pool()?))
    }

    /// Store every mapping in `entries`, returning the number of rows written.
    pub async fn import(&self, entries: HashMap<String, RatingMapping>) -> Result<usize> {
        let pool = self.pool.clone();
        let titles = entries.len();
        let written = tokio::task::spawn_blocking(move || -> Result<usize> {
            let conn = pool::get_conn(&pool)?;
            let mut written = 0;
            for (title_id, mapping) in &entries {
                written += ratings::upsert_ratings(&conn, title_id, mapping)?;
            }
            Ok(written)
        })
        .await
        .map_err(|e| Error::Internal(format!("spawn_blocking join error: {e}")))??;

        info!(titles, rows = written, "Imported ratings");
        Ok(written)
    }
}

#[async_trait]
impl RatingsDatabase for SqliteRatingsDb {
    async fn get_ratings_for_ids(&self, ids: &[String]) -> Result<HashMap<String, RatingMapping>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let pool = self.pool.clone();
        let ids = ids.to_vec();
        tokio::task::spawn_blocking(move || {
            let conn = pool::get_conn(&pool)?;
            ratings::get_ratings_for_ids(&conn, &ids)
        })
        .await
        .map_err(|e| Error::Internal(format!("spawn_blocking join error: {e}")))?
    }
}
