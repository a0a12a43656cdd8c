//! Canonical rating types and score normalization.
//!
//! Every score that enters the system passes through [`normalize`], so a
//! [`RatingValue`] only ever holds ASCII digits and at most one decimal point.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// Cache schema version. Bumping it invalidates every previously cached key.
pub const SCHEMA_VERSION: &str = "v1.0";

/// General audience score.
pub const IMDB: &str = "imdb";
/// Critic aggregate score.
pub const METACRITIC: &str = "metacritic";
/// Named third-party aggregate selected from the provider's source list.
pub const ROTTEN_TOMATOES: &str = "rotten_tomatoes";

/// Every provider name the rating fetcher can produce.
pub const PROVIDERS: [&str; 3] = [IMDB, METACRITIC, ROTTEN_TOMATOES];

/// Selection token that matches every provider.
pub const ALL_PROVIDERS: &str = "all";

// ---------------------------------------------------------------------------
// Normalizer
// ---------------------------------------------------------------------------

/// Canonicalize a raw score string into a [`RatingValue`].
///
/// `"8.1/10"` becomes `"8.1"`, `"72 %"` becomes `"72"`, `"91%"` becomes
/// `"91"`, and `"N/A"` becomes the empty value. Never fails.
pub fn normalize(raw: &str) -> RatingValue {
    let head = raw.trim();
    let head = head.split('/').next().unwrap_or_default();
    let head = head.split_whitespace().next().unwrap_or_default();
    let head = head.strip_suffix('%').unwrap_or(head);

    let mut seen_dot = false;
    let value = head
        .chars()
        .filter(|c| match c {
            '0'..='9' => true,
            '.' if !seen_dot => {
                seen_dot = true;
                true
            }
            _ => false,
        })
        .collect();

    RatingValue(value)
}

// ---------------------------------------------------------------------------
// RatingValue
// ---------------------------------------------------------------------------

/// A normalized numeric-string score.
///
/// Deserializing re-runs [`normalize`], so stored values written by older
/// versions are canonicalized on read.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RatingValue(String);

impl RatingValue {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse as a number. `None` for the empty value.
    pub fn as_f64(&self) -> Option<f64> {
        self.0.parse().ok()
    }
}

impl AsRef<str> for RatingValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RatingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RatingValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(normalize(&raw))
    }
}

// ---------------------------------------------------------------------------
// RatingMapping
// ---------------------------------------------------------------------------

/// Provider name to normalized score for a single title.
///
/// A provider is either present with a non-empty value or absent; empty
/// values are dropped on insert. Iteration order is lexicographic by
/// provider name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RatingMapping(BTreeMap<String, RatingValue>);

impl RatingMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a score, returning `false` (and leaving the mapping untouched)
    /// when the value is empty.
    pub fn insert(&mut self, provider: impl Into<String>, value: RatingValue) -> bool {
        if value.is_empty() {
            return false;
        }
        self.0.insert(provider.into(), value);
        true
    }

    pub fn get(&self, provider: &str) -> Option<&RatingValue> {
        self.0.get(provider)
    }

    pub fn contains(&self, provider: &str) -> bool {
        self.0.contains_key(provider)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RatingValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K, V> FromIterator<(K, V)> for RatingMapping
where
    K: Into<String>,
    V: AsRef<str>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut mapping = RatingMapping::new();
        for (provider, raw) in iter {
            mapping.insert(provider, normalize(raw.as_ref()));
        }
        mapping
    }
}

impl<'de> Deserialize<'de> for RatingMapping {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, RatingValue>::deserialize(deserializer)?;
        Ok(raw.into_iter().collect())
    }
}

// ---------------------------------------------------------------------------
// RatingKey
// ---------------------------------------------------------------------------

/// Cache addressing unit, rendered as `{title_id}_{provider}_{schema_version}`
/// (e.g. `tt0111161_imdb_v1.0`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingKey<'a> {
    pub title_id: &'a str,
    pub provider: &'a str,
    pub schema_version: &'a str,
}

impl<'a> RatingKey<'a> {
    pub fn new(title_id: &'a str, provider: &'a str, schema_version: &'a str) -> Self {
        Self {
            title_id,
            provider,
            schema_version,
        }
    }
}

impl fmt::Display for RatingKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.title_id, self.provider, self.schema_version)
    }
}

// ---------------------------------------------------------------------------
// ProviderSelection
// ---------------------------------------------------------------------------

/// The set of provider names a caller asked for. The literal token `all`
/// selects every provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderSelection(BTreeSet<String>);

impl ProviderSelection {
    pub fn all() -> Self {
        [ALL_PROVIDERS].into_iter().collect()
    }

    pub fn allows(&self, provider: &str) -> bool {
        self.0.contains(ALL_PROVIDERS) || self.0.contains(provider)
    }
}

impl<S: Into<String>> FromIterator<S> for ProviderSelection {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl FromStr for ProviderSelection {
    type Err = std::convert::Infallible;

    /// Parse a comma-separated list such as `imdb,metacritic`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_percent() {
        assert_eq!(normalize("91%").as_str(), "91");
    }

    #[test]
    fn normalize_fraction() {
        assert_eq!(normalize("8.1/10").as_str(), "8.1");
        assert_eq!(normalize("74/100").as_str(), "74");
    }

    #[test]
    fn normalize_spaced_unit() {
        assert_eq!(normalize("72 %").as_str(), "72");
    }

    #[test]
    fn normalize_unavailable_sentinel() {
        assert!(normalize("N/A").is_empty());
        assert!(normalize("").is_empty());
    }

    #[test]
    fn normalize_keeps_single_decimal_point() {
        assert_eq!(normalize("8.1.2").as_str(), "8.12");
    }

    #[test]
    fn normalize_is_idempotent() {
        let inputs = [
            "91%", "8.1/10", "72 %", "N/A", "", "  7.5 ", "abc", "1.2.3", "100/100", "9,3",
            "12 34", "%", "/10",
        ];
        for raw in inputs {
            let once = normalize(raw);
            let twice = normalize(once.as_str());
            assert_eq!(once, twice, "normalize not idempotent for {raw:?}");
            assert!(!once.as_str().contains(['%', '/', ' ']));
        }
    }

    #[test]
    fn mapping_drops_empty_values() {
        let mut mapping = RatingMapping::new();
        assert!(!mapping.insert(IMDB, normalize("N/A")));
        assert!(mapping.insert(METACRITIC, normalize("70")));
        assert_eq!(mapping.len(), 1);
        assert!(!mapping.contains(IMDB));
    }

    #[test]
    fn mapping_iterates_in_provider_order() {
        let mapping: RatingMapping = [("metacritic", "70"), ("imdb", "8")].into_iter().collect();
        let names: Vec<&str> = mapping.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["imdb", "metacritic"]);
    }

    #[test]
    fn mapping_deserialize_normalizes() {
        let mapping: RatingMapping =
            serde_json::from_str(r#"{"imdb":"9.3/10","rotten_tomatoes":"91%","metacritic":"N/A"}"#)
                .unwrap();
        assert_eq!(mapping.get(IMDB).unwrap().as_str(), "9.3");
        assert_eq!(mapping.get(ROTTEN_TOMATOES).unwrap().as_str(), "91");
        assert!(!mapping.contains(METACRITIC));
    }

    #[test]
    fn rating_key_format() {
        let key = RatingKey::new("tt0111161", IMDB, SCHEMA_VERSION);
        assert_eq!(key.to_string(), "tt0111161_imdb_v1.0");
    }

    #[test]
    fn selection_parsing() {
        let sel: ProviderSelection = "imdb, metacritic,,".parse().unwrap();
        assert!(sel.allows("imdb"));
        assert!(sel.allows("metacritic"));
        assert!(!sel.allows("rotten_tomatoes"));
    }

    #[test]
    fn selection_all_token() {
        let sel = ProviderSelection::all();
        assert!(sel.allows("anything"));
        let empty = ProviderSelection::default();
        assert!(!empty.allows("imdb"));
    }
}
