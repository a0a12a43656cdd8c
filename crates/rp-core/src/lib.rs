//! rp-core: shared types, errors, configuration, and rating normalization.
//!
//! This crate is the foundational dependency for the other rp-* crates and
//! the `ratedposters` service, providing title identifiers, the canonical
//! rating types, the metadata record shape, and a unified error type.

pub mod config;
pub mod error;
pub mod ids;
pub mod metadata;
pub mod rating;

// Re-export the most commonly used items at the crate root.
pub use error::{Error, Result};
pub use ids::*;
pub use metadata::MetadataRecord;
pub use rating::{normalize, ProviderSelection, RatingKey, RatingMapping, RatingValue};
