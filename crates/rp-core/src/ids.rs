//! Title identifiers and content-type tags.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ---------------------------------------------------------------------------
// ContentType
// ---------------------------------------------------------------------------

/// Content-type tag attached to every title id.
///
/// Unknown tags are preserved verbatim so they round-trip to collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum ContentType {
    #[default]
    Movie,
    Series,
    Other(String),
}

impl ContentType {
    pub fn as_str(&self) -> &str {
        match self {
            ContentType::Movie => "movie",
            ContentType::Series => "series",
            ContentType::Other(tag) => tag,
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim();
        Ok(if tag.eq_ignore_ascii_case("movie") {
            ContentType::Movie
        } else if tag.eq_ignore_ascii_case("series") {
            ContentType::Series
        } else {
            ContentType::Other(tag.to_string())
        })
    }
}

impl Serialize for ContentType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ContentType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(raw.parse().unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// TitleId
// ---------------------------------------------------------------------------

/// External identifier for a piece of media content (e.g. `tt0111161`)
/// together with its content type. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TitleId {
    id: String,
    content_type: ContentType,
}

impl TitleId {
    pub fn new(id: impl Into<String>, content_type: ContentType) -> Self {
        Self {
            id: id.into(),
            content_type,
        }
    }

    pub fn movie(id: impl Into<String>) -> Self {
        Self::new(id, ContentType::Movie)
    }

    pub fn series(id: impl Into<String>) -> Self {
        Self::new(id, ContentType::Series)
    }

    /// The raw external id, used as the cache and database key.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn content_type(&self) -> &ContentType {
        &self.content_type
    }
}

impl fmt::Display for TitleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.content_type, self.id)
    }
}
