//! Embedded SQL migrations and runner.
//!
//! Versioned SQL lives in `MIGRATIONS`; applied versions are recorded in
//! `schema_migrations`.

use std::collections::BTreeSet;

use rusqlite::Connection;
use rp_core::{Error, Result};

/// V1: per-title provider scores.
const V1_INITIAL: &str = r#"
CREATE TABLE ratings (
    title_id   TEXT NOT NULL,
    provider   TEXT NOT NULL,
    score      TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    PRIMARY KEY (title_id, provider)
);

CREATE INDEX idx_ratings_title ON ratings(title_id);
"#;

const MIGRATIONS: &[(i64, &str)] = &[(1, V1_INITIAL)];

fn db_err(context: &str) -> impl Fn(rusqlite::Error) -> Error + '_ {
    move |e| Error::database(format!("{context}: {e}"))
}

/// Versions already recorded in `schema_migrations`.
fn applied_versions(conn: &Connection) -> Result<BTreeSet<i64>> {
    let mut stmt = conn
        .prepare("SELECT version FROM schema_migrations")
        .map_err(db_err("read schema_migrations"))?;
    let versions = stmt
        .query_map([], |row| row.get::<_, i64>(0))
        .map_err(db_err("read schema_migrations"))?
        .collect::<rusqlite::Result<BTreeSet<_>>>()
        .map_err(db_err("read schema_migrations"))?;
    Ok(versions)
}

/// Bring the ratings schema up to date. Each pending migration runs in its
/// own transaction together with its bookkeeping row.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version    INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
    )
    .map_err(db_err("create schema_migrations"))?;

    let applied = applied_versions(conn)?;
    let pending = MIGRATIONS.iter().filter(|(v, _)| !applied.contains(v));

    for &(version, sql) in pending {
        let tx = conn.unchecked_transaction().map_err(db_err("begin migration"))?;
        tx.execute_batch(sql)
            .map_err(|e| Error::database(format!("Migration V{version} failed: {e}")))?;
        tx.execute("INSERT INTO schema_migrations (version) VALUES (?1)", [version])
            .map_err(db_err("record migration"))?;
        tx.commit().map_err(db_err("commit migration"))?;
        tracing::debug!(version, "Applied ratings migration");
    }

    Ok(())
}
