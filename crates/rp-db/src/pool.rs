//! Connection pool management for SQLite via r2d2.

use std::sync::atomic::{AtomicU64, Ordering};

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rp_core::{Error, Result};

use crate::migrations;

/// Type alias for the database connection pool.
pub type DbPool = Pool<SqliteConnectionManager>;

/// Type alias for a pooled database connection.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

const POOL_SIZE: u32 = 4;

/// Build the pool and migrate through its first connection.
fn build(manager: SqliteConnectionManager) -> Result<DbPool> {
    let pool = Pool::builder()
        .max_size(POOL_SIZE)
        .build(manager)
        .map_err(|e| Error::database(format!("Failed to create connection pool: {e}")))?;
    migrations::run_migrations(&*get_conn(&pool)?)?;
    Ok(pool)
}

/// Open the ratings database at `db_path`, creating and migrating it as
/// needed. Every connection runs in WAL mode.
pub fn init_pool(db_path: &str) -> Result<DbPool> {
    let manager = SqliteConnectionManager::file(db_path).with_init(|conn| {
        conn.execute_batch("PRAGMA journal_mode = WAL; PRAGMA busy_timeout = 5000;")
    });
    let pool = build(manager)?;
    tracing::debug!(path = db_path, "Ratings database ready");
    Ok(pool)
}

/// In-memory ratings database for tests. Each call gets its own named
/// shared-cache database, so connections within one pool see the same data
/// and separate pools never do.
pub fn init_memory_pool() -> Result<DbPool> {
    static NEXT: AtomicU64 = AtomicU64::new(0);
    let n = NEXT.fetch_add(1, Ordering::Relaxed);
    build(SqliteConnectionManager::file(format!(
        "file:ratingsdb_{n}?mode=memory&cache=shared"
    )))
}

pub fn get_conn(pool: &DbPool) -> Result<PooledConnection> {
    pool.get()
        .map_err(|e| Error::database(format!("Failed to get connection from pool: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_pools_are_isolated() {
        let a = init_memory_pool().unwrap();
        let b = init_memory_pool().unwrap();
        get_conn(&a)
            .unwrap()
            .execute(
                "INSERT INTO ratings (title_id, provider, score, updated_at) VALUES ('tt1', 'imdb', '7', 'now')",
                [],
            )
            .unwrap();

        let count = |pool: &DbPool| -> i64 {
            get_conn(pool)
                .unwrap()
                .query_row("SELECT COUNT(*) FROM ratings", [], |row| row.get(0))
                .unwrap()
        };
        assert_eq!(count(&a), 1);
        assert_eq!(count(&b), 0);
        assert_eq!(a.max_size(), POOL_SIZE);
    }

    #[test]
    fn migrations_run_on_init() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='ratings'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn file_pool_creates_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ratings.db");
        let pool = init_pool(&path.to_string_lossy()).unwrap();
        get_conn(&pool).unwrap();
        assert!(path.exists());
    }
}
