//! Tag normalization.
//!
//! Every tag stored on a note, and every tag used for filtering, goes through
//! [`normalize_tag`] so that `" Travel"` and `"travel"` are the same label.

use std::collections::{BTreeSet, HashSet};

use crate::Note;

/// Trims surrounding whitespace and lowercases a tag.
pub fn normalize_tag(tag: &str) -> String {
    tag.trim().to_lowercase()
}

/// Normalizes a sequence of raw tags, dropping empty results and duplicates.
///
/// First-seen order is kept so a note's chips render in the order they were typed.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    tags.into_iter()
        .map(|tag| normalize_tag(tag.as_ref()))
        .filter(|tag| !tag.is_empty())
        .filter(|tag| seen.insert(tag.clone()))
        .collect()
}

/// Collects the sorted union of current tags across `notes`.
///
/// Version history is deliberately not consulted.
pub fn collect_tags(notes: &[Note]) -> Vec<String> {
    notes
        .iter()
        .flat_map(|note| note.tags.iter())
        .map(|tag| normalize_tag(tag))
        .filter(|tag| !tag.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
