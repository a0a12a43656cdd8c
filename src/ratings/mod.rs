//! Rating lookup: the live provider seam, cache-first resolution, and
//! provider filtering.
//!
//! - [`omdb`] -- OMDb-compatible [`RatingSource`].
//! - [`resolver`] -- cache read, live fetch on miss, write-through.
//! - [`filter`] -- narrow to the requested providers and render the
//!   description fragment.

pub mod filter;
pub mod omdb;
pub mod resolver;

use async_trait::async_trait;
use rp_core::RatingMapping;

pub use filter::filter;
pub use omdb::OmdbClient;
pub use resolver::RatingResolver;

/// A live rating provider.
///
/// Implementations fold every failure (network, timeout, non-success
/// response, malformed body) into an empty mapping and log it.
#[async_trait]
pub trait RatingSource: Send + Sync {
    /// Short, lowercase identifier for this source (e.g. `"omdb"`).
    fn name(&self) -> &'static str;

    /// Returns `true` when the source has credentials and will make requests.
    fn is_available(&self) -> bool;

    /// Look up scores for the exact `title`, optionally narrowed by `year`.
    async fn fetch(&self, title: &str, year: Option<&str>) -> RatingMapping;
}
