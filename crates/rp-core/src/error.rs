//! Unified error type for ratedposters.
//!
//! Collaborator calls report their outcome as [`Result`]; the pipeline folds
//! the `Err` side into empty mappings or unchanged records at each boundary.

use std::fmt;

/// Unified error type covering all failure modes in ratedposters.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested entity could not be found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity (e.g. "title", "poster").
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// Input or configuration failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// An upstream service (metadata, rating provider, poster host) failed.
    #[error("Upstream error [{service}]: {message}")]
    Upstream {
        /// Name of the upstream service.
        service: String,
        /// Human-readable error description.
        message: String,
    },

    /// The shared cache store is unreachable or rejected a command.
    #[error("Cache error: {0}")]
    Cache(String),

    /// A database operation failed.
    #[error("Database error: {source}")]
    Database {
        /// The underlying database error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Poster decoding or rendering failed.
    #[error("Image error: {0}")]
    Image(String),

    /// Catch-all for unexpected internal errors.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Convenience constructor for [`Error::NotFound`].
    pub fn not_found(entity: impl Into<String>, id: impl fmt::Display) -> Self {
        Error::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Convenience constructor for [`Error::Upstream`].
    pub fn upstream(service: impl Into<String>, message: impl fmt::Display) -> Self {
        Error::Upstream {
            service: service.into(),
            message: message.to_string(),
        }
    }

    /// Convenience constructor for [`Error::Cache`].
    pub fn cache(message: impl fmt::Display) -> Self {
        Error::Cache(message.to_string())
    }

    /// Convenience constructor for [`Error::Database`].
    pub fn database(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Error::Database {
            source: source.into(),
        }
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
