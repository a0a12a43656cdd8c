use rp_core::{MetadataRecord, ProviderSelection, TitleId};
use tracing::{debug, warn};

use super::RatingPipeline;
use crate::ratings::filter;

impl RatingPipeline {
    /// Fetch metadata for `title_id`, attach the requested ratings to its
    /// description and annotate its poster.
    ///
    /// A record with no name is returned as the metadata source produced it.
    pub async fn get_rated_metadata(
        &self,
        title_id: &TitleId,
        requested: &ProviderSelection,
    ) -> MetadataRecord {
        let mut record = self.metadata.get_metadata(title_id).await;
        if record.is_empty() {
            debug!(title_id = %title_id, source = self.metadata.name(), "No metadata, skipping ratings");
            return record;
        }

        let ratings = self
            .resolver
            .resolve(title_id, &record.name, record.lookup_year())
            .await;

        let (filtered, fragment) = filter(&ratings, requested);
        record.append_description(&fragment);

        if let Err(e) = self.coordinator.annotate(&mut record, &filtered).await {
            warn!(title_id = %title_id, error = %e, "Poster annotation failed");
        }
        record
    }
}
