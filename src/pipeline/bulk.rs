use futures::future::join_all;
use rp_core::{MetadataRecord, ProviderSelection, RatingMapping};
use tracing::{debug, warn};

use super::RatingPipeline;
use crate::ratings::filter;

impl RatingPipeline {
    /// Attach stored ratings to a page of catalog records.
    ///
    /// Ratings come from one batched database read; the live provider is
    /// never consulted. Items are annotated concurrently and returned in input
    /// order. A failed database read returns every record unchanged.
    pub async fn get_rated_batch(
        &self,
        records: Vec<MetadataRecord>,
        requested: &ProviderSelection,
    ) -> Vec<MetadataRecord> {
        if records.is_empty() {
            return records;
        }

        let ids: Vec<String> = records.iter().map(|r| r.id.clone()).collect();
        let stored = match self.ratings_db.get_ratings_for_ids(&ids).await {
            Ok(stored) => stored,
            Err(e) => {
                warn!(count = ids.len(), error = %e, "Ratings database lookup failed");
                return records;
            }
        };
        debug!(count = ids.len(), rated = stored.len(), "Loaded stored ratings");

        let items = records.into_iter().map(|record| {
            let ratings = stored.get(&record.id);
            self.rate_item(record, ratings, requested)
        });
        join_all(items).await
    }

    async fn rate_item(
        &self,
        mut record: MetadataRecord,
        ratings: Option<&RatingMapping>,
        requested: &ProviderSelection,
    ) -> MetadataRecord {
        let Some(ratings) = ratings else {
            return record;
        };

        let (filtered, fragment) = filter(ratings, requested);
        record.append_description(&fragment);

        if let Err(e) = self.coordinator.annotate(&mut record, &filtered).await {
            warn!(id = %record.id, error = %e, "Poster annotation failed");
        }
        record
    }
}
