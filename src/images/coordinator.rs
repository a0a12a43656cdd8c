//! Poster fetch and annotation for one record.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use rp_core::{MetadataRecord, RatingMapping, Result};
use tracing::debug;

use super::{PosterAnnotator, PosterSource};

/// Replaces a record's poster with an annotated rendition.
pub struct AnnotationCoordinator {
    posters: Arc<dyn PosterSource>,
    annotator: Arc<dyn PosterAnnotator>,
}

impl AnnotationCoordinator {
    pub fn new(posters: Arc<dyn PosterSource>, annotator: Arc<dyn PosterAnnotator>) -> Self {
        Self { posters, annotator }
    }

    /// Annotate `record`'s poster with `filtered`.
    ///
    /// Does nothing when there are no ratings or no poster. On error the
    /// record is left untouched; callers decide whether to log or propagate.
    pub async fn annotate(&self, record: &mut MetadataRecord, filtered: &RatingMapping) -> Result<()> {
        if filtered.is_empty() {
            return Ok(());
        }
        let Some(url) = record.poster_url() else {
            debug!(id = %record.id, "No poster to annotate");
            return Ok(());
        };

        let data = self.posters.fetch_poster(url).await?;
        let encoded = STANDARD.encode(&data);
        let annotated = self.annotator.annotate(&encoded, filtered).await?;

        record.poster = Some(annotated);
        Ok(())
    }
}
