//! Title rating operations.

use std::collections::HashMap;

use chrono::Utc;
use rusqlite::Connection;
use rp_core::{normalize, Error, RatingMapping, Result};

/// Upper bound on bound parameters per `IN (...)` query.
const MAX_IDS_PER_QUERY: usize = 500;

/// Insert or update every score in `ratings` for `title_id`.
///
/// Providers absent from `ratings` are left untouched. Returns the number of
/// rows written.
pub fn upsert_ratings(conn: &Connection, title_id: &str, ratings: &RatingMapping) -> Result<usize> {
    let now = Utc::now().to_rfc3339();
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| Error::database(e.to_string()))?;

    let mut written = 0;
    for (provider, score) in ratings.iter() {
        written += tx
            .execute(
                "INSERT INTO ratings (title_id, provider, score, updated_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(title_id, provider)
                 DO UPDATE SET score = excluded.score, updated_at = excluded.updated_at",
                rusqlite::params![title_id, provider, score.as_str(), now],
            )
            .map_err(|e| Error::database(e.to_string()))?;
    }

    tx.commit().map_err(|e| Error::database(e.to_string()))?;
    Ok(written)
}

/// Batched lookup: map every id that has at least one stored score to its
/// ratings. Ids with nothing stored are absent from the result.
pub fn get_ratings_for_ids(
    conn: &Connection,
    title_ids: &[String],
) -> Result<HashMap<String, RatingMapping>> {
    let mut result: HashMap<String, RatingMapping> = HashMap::new();

    for chunk in title_ids.chunks(MAX_IDS_PER_QUERY) {
        let placeholders = (1..=chunk.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let q = format!(
            "SELECT title_id, provider, score FROM ratings WHERE title_id IN ({placeholders})"
        );

        let mut stmt = conn
            .prepare(&q)
            .map_err(|e| Error::database(e.to_string()))?;

        let rows = stmt
            .query_map(rusqlite::params_from_iter(chunk.iter()), |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })
            .map_err(|e| Error::database(e.to_string()))?;

        for row in rows {
            let (title_id, provider, score) = row.map_err(|e| Error::database(e.to_string()))?;
            result
                .entry(title_id)
                .or_default()
                .insert(provider, normalize(&score));
        }
    }

    result.retain(|_, mapping| !mapping.is_empty());
    Ok(result)
}
