//! Narrowing a rating mapping to the caller's requested providers.

use rp_core::{ProviderSelection, RatingMapping};

/// Keep the providers `requested` allows and render them as a description
/// fragment.
///
/// The fragment holds one `"(name: value) "` segment per kept provider, in
/// mapping order, with underscores in the name shown as spaces. It is meant
/// to be appended to an existing description.
pub fn filter(mapping: &RatingMapping, requested: &ProviderSelection) -> (RatingMapping, String) {
    let mut filtered = RatingMapping::new();
    let mut fragment = String::new();

    for (provider, value) in mapping.iter() {
        if !requested.allows(provider) {
            continue;
        }
        fragment.push_str(&format!("({}: {}) ", provider.replace('_', " "), value));
        filtered.insert(provider, value.clone());
    }

    (filtered, fragment)
}
