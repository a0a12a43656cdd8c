//! Poster retrieval and rating annotation.
//!
//! - [`poster`] -- [`PosterSource`] seam and the HTTP implementation.
//! - [`annotator`] -- [`PosterAnnotator`] seam and the badge renderer.
//! - [`coordinator`] -- fetch, encode, annotate, replace.

pub mod annotator;
pub mod coordinator;
pub mod poster;

use async_trait::async_trait;
use bytes::Bytes;
use rp_core::{RatingMapping, Result};

pub use annotator::BadgeAnnotator;
pub use coordinator::AnnotationCoordinator;
pub use poster::HttpPosterSource;

/// Fetches raw poster bytes from a URL.
#[async_trait]
pub trait PosterSource: Send + Sync {
    async fn fetch_poster(&self, url: &str) -> Result<Bytes>;
}

/// Produces an annotated poster from a base64 image and the ratings to show.
///
/// The returned string is used verbatim as the record's new poster
/// reference.
#[async_trait]
pub trait PosterAnnotator: Send + Sync {
    async fn annotate(&self, image_base64: &str, ratings: &RatingMapping) -> Result<String>;
}
