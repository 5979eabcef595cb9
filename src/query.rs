//! Search and tag filtering over a note collection.
//!
//! Search is a case-insensitive substring match against the live title and
//! content and against the title and content of every stored version. Tag
//! filtering only looks at a note's current tags.

use log::debug;
use rand::{seq::SliceRandom, Rng};

use crate::{normalize_tags, Note};

/// Default number of notes returned by [`pick_random`].
pub const DEFAULT_RANDOM_PICKS: usize = 3;

/// A search string combined with a set of tags every result must carry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteQuery {
    search: String,
    required_tags: Vec<String>,
}

impl NoteQuery {
    pub fn new<I, S>(search: &str, required_tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            search: search.to_lowercase(),
            required_tags: normalize_tags(required_tags),
        }
    }

    pub fn matches(&self, note: &Note) -> bool {
        self.matches_tags(note) && self.matches_search(note)
    }

    fn matches_tags(&self, note: &Note) -> bool {
        self.required_tags.iter().all(|tag| note.has_tag(tag))
    }

    fn matches_search(&self, note: &Note) -> bool {
        if self.search.is_empty() {
            return true;
        }

        let hit = |text: &str| text.to_lowercase().contains(&self.search);
        hit(&note.title)
            || hit(&note.content)
            || note
                .versions
                .iter()
                .any(|version| hit(&version.title) || hit(&version.content))
    }

    /// Matching notes in their original order.
    pub fn apply<'a>(&self, notes: &'a [Note]) -> Vec<&'a Note> {
        let matched: Vec<&Note> = notes.iter().filter(|note| self.matches(note)).collect();
        debug!(
            "Query {:?} with tags {:?} matched {} of {} notes",
            self.search,
            self.required_tags,
            matched.len(),
            notes.len()
        );
        matched
    }
}

/// Filters `notes` by search string and required tags, preserving order.
pub fn filter<'a, I, S>(notes: &'a [Note], search_query: &str, required_tags: I) -> Vec<&'a Note>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    NoteQuery::new(search_query, required_tags).apply(notes)
}

/// Picks up to `count` distinct notes carrying every tag in `required_tags`.
pub fn pick_random<'a, I, S, R>(
    notes: &'a [Note],
    required_tags: I,
    count: usize,
    rng: &mut R,
) -> Vec<&'a Note>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
    R: Rng + ?Sized,
{
    let candidates = NoteQuery::new("", required_tags).apply(notes);
    candidates.choose_multiple(rng, count).copied().collect()
}
