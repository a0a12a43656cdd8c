//! Catalog metadata record returned to callers.

use serde::{Deserialize, Serialize};

use crate::ids::{ContentType, TitleId};

/// Metadata for one title as served through the catalog interface.
///
/// The rating pipeline only ever rewrites `description` and `poster`; the
/// identity fields are owned by the metadata source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Poster URL, or an inline `data:` URI after annotation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
}

impl MetadataRecord {
    /// The record a metadata source returns when the lookup failed.
    pub fn empty(title_id: &TitleId) -> Self {
        Self {
            id: title_id.id().to_string(),
            content_type: title_id.content_type().clone(),
            ..Self::default()
        }
    }

    /// `true` when the record carries no name, i.e. the lookup produced
    /// nothing worth rating.
    pub fn is_empty(&self) -> bool {
        self.name.trim().is_empty()
    }

    /// The poster URL, if one is present and non-blank.
    pub fn poster_url(&self) -> Option<&str> {
        self.poster.as_deref().filter(|p| !p.trim().is_empty())
    }

    /// Four-digit release year suitable for narrowing a rating lookup.
    ///
    /// Series ranges such as `"2008-2013"` yield their first year.
    pub fn lookup_year(&self) -> Option<&str> {
        self.year
            .as_deref()
            .map(str::trim)
            .and_then(|y| y.get(..4))
            .filter(|y| y.bytes().all(|b| b.is_ascii_digit()))
    }

    pub fn append_description(&mut self, fragment: &str) {
        self.description.push_str(fragment);
    }
}
