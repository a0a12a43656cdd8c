//! Shared external key-value store.
//!
//! The [`SharedStore`] trait is the seam the cache tier talks to; the
//! [`RedisStore`] implementation keeps one lazily opened multiplexed
//! connection and drops it when the connection itself fails, so the next
//! call reopens.

use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use rp_core::{Error, Result};
use tracing::debug;

/// Bound on establishing a connection to the shared store.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Key-value store shared between process instances.
///
/// The connection has an explicit open/closed state; callers check
/// [`is_open`](Self::is_open) and call [`open`](Self::open) before use.
#[async_trait]
pub trait SharedStore: Send + Sync {
    /// Short identifier for logs (e.g. `"redis"`).
    fn name(&self) -> &'static str;

    fn is_open(&self) -> bool;

    /// Establish the connection. A no-op when already open.
    async fn open(&self) -> Result<()>;

    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;

    async fn expire(&self, key: &str, seconds: u64) -> Result<()>;

    /// Store every `(key, value)` pair with a `seconds` expiry as one unit:
    /// either all keys land with their expiry or none do.
    async fn set_many(&self, entries: &[(String, String)], seconds: u64) -> Result<()>;
}

/// Redis-backed [`SharedStore`].
pub struct RedisStore {
    client: redis::Client,
    connection: Mutex<Option<MultiplexedConnection>>,
}

impl RedisStore {
    /// Create a store for `url` (e.g. `redis://127.0.0.1:6379`).
    ///
    /// Only the URL is validated here; no connection is made until
    /// [`SharedStore::open`] runs.
    pub fn new(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| Error::Validation(format!("invalid redis url {url:?}: {e}")))?;
        Ok(Self {
            client,
            connection: Mutex::new(None),
        })
    }

    fn connection(&self) -> Result<MultiplexedConnection> {
        self.connection
            .lock()
            .clone()
            .ok_or_else(|| Error::cache("redis connection is not open"))
    }

    /// Convert a command failure, closing the connection when the failure
    /// means it is no longer usable.
    fn command_failed(&self, op: &str, key: &str, err: redis::RedisError) -> Error {
        if err.is_io_error() || err.is_connection_dropped() || err.is_timeout() {
            debug!(op, key, error = %err, "Redis connection lost; closing");
            *self.connection.lock() = None;
        }
        Error::cache(format!("redis {op} {key}: {err}"))
    }
}

#[async_trait]
impl SharedStore for RedisStore {
    fn name(&self) -> &'static str {
        "redis"
    }

    fn is_open(&self) -> bool {
        self.connection.lock().is_some()
    }

    async fn open(&self) -> Result<()> {
        if self.is_open() {
            return Ok(());
        }

        let conn = tokio::time::timeout(
            CONNECT_TIMEOUT,
            self.client.get_multiplexed_async_connection(),
        )
        .await
        .map_err(|_| Error::cache("timed out connecting to redis"))?
        .map_err(|e| Error::cache(format!("failed to connect to redis: {e}")))?;

        debug!("Redis connection opened");
        *self.connection.lock() = Some(conn);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.connection()?;
        let value: Option<String> = conn
            .get(key)
            .await
            .map_err(|e| self.command_failed("GET", key, e))?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut conn = self.connection()?;
        let _: () = conn
            .set(key, value)
            .await
            .map_err(|e| self.command_failed("SET", key, e))?;
        Ok(())
    }

    async fn expire(&self, key: &str, seconds: u64) -> Result<()> {
        let mut conn = self.connection()?;
        let seconds = i64::try_from(seconds).unwrap_or(i64::MAX);
        let _: () = conn
            .expire(key, seconds)
            .await
            .map_err(|e| self.command_failed("EXPIRE", key, e))?;
        Ok(())
    }

    async fn set_many(&self, entries: &[(String, String)], seconds: u64) -> Result<()> {
        let Some((first, _)) = entries.first() else {
            return Ok(());
        };
        let mut conn = self.connection()?;

        // MULTI/EXEC with SET .. EX so no key is ever stored without a TTL.
        let mut pipe = redis::pipe();
        pipe.atomic();
        for (key, value) in entries {
            pipe.cmd("SET")
                .arg(key)
                .arg(value)
                .arg("EX")
                .arg(seconds.max(1))
                .ignore();
        }
        let _: () = pipe
            .query_async(&mut conn)
            .await
            .map_err(|e| self.command_failed("MULTI SET", first, e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_url() {
        assert!(RedisStore::new("not a url").is_err());
    }

    #[test]
    fn starts_closed() {
        let store = RedisStore::new("redis://127.0.0.1:6379").unwrap();
        assert!(!store.is_open());
        assert_eq!(store.name(), "redis");
    }

    #[tokio::test]
    async fn commands_fail_when_closed() {
        let store = RedisStore::new("redis://127.0.0.1:6379").unwrap();
        let err = store.get("tt1_imdb_v1.0").await.unwrap_err();
        assert!(matches!(err, Error::Cache(_)));

        let entries = vec![("tt1_imdb_v1.0".to_string(), "8".to_string())];
        assert!(store.set_many(&entries, 60).await.is_err());
    }

    #[tokio::test]
    async fn empty_batch_needs_no_connection() {
        let store = RedisStore::new("redis://127.0.0.1:6379").unwrap();
        store.set_many(&[], 60).await.unwrap();
    }

    #[tokio::test]
    async fn open_fails_for_unreachable_host() {
        // port 1 is reserved and never has a listener
        let store = RedisStore::new("redis://127.0.0.1:1").unwrap();
        assert!(store.open().await.is_err());
        assert!(!store.is_open());
    }
}
