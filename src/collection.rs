//! The in-memory note collection and its derived tag index.
//!
//! Only the notes are persisted. The tag index is rebuilt from the notes
//! after every mutation and on every load, so it can never drift.

use chrono::{DateTime, Utc};
use log::{debug, trace};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{collect_tags, next_after, normalize_tags, Note};

/// All notes plus the sorted set of tags currently in use.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotesCollection {
    notes: Vec<Note>,
    tags: Vec<String>,
}

#[derive(Serialize)]
struct PersistedNotesRef<'a> {
    notes: &'a [Note],
}

#[derive(Deserialize)]
struct PersistedNotes {
    notes: Vec<Note>,
}

impl NotesCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a collection from stored notes, normalizing their tags and
    /// deriving the tag index.
    pub fn from_notes(mut notes: Vec<Note>) -> Self {
        for note in &mut notes {
            note.tags = normalize_tags(&note.tags);
        }
        let mut collection = Self {
            notes,
            tags: Vec::new(),
        };
        collection.recompute_tags();
        collection
    }

    /// Notes, newest additions first.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Sorted union of every note's current tags.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn get(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == id)
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub(crate) fn prepend(&mut self, note: Note) {
        trace!("Prepending note {}", note.id);
        self.notes.insert(0, note);
        self.recompute_tags();
    }

    /// Archives the current state of note `id` and replaces its fields.
    ///
    /// Returns `false` without touching anything when `id` is unknown.
    pub(crate) fn revise(
        &mut self,
        id: &str,
        title: String,
        content: String,
        tags: Vec<String>,
        now: DateTime<Utc>,
    ) -> bool {
        let Some(note) = self.notes.iter_mut().find(|note| note.id == id) else {
            return false;
        };

        let previous = note.current_version();
        note.updated_at = next_after(previous.updated_at, now);
        note.versions.push(previous);
        note.title = title;
        note.content = content;
        note.tags = normalize_tags(tags);
        debug!(
            "Note {} now has {} prior versions",
            note.id,
            note.versions.len()
        );

        self.recompute_tags();
        true
    }

    /// Removes note `id` together with its history.
    pub(crate) fn remove(&mut self, id: &str) -> Option<Note> {
        let position = self.notes.iter().position(|note| note.id == id)?;
        let removed = self.notes.remove(position);
        self.recompute_tags();
        Some(removed)
    }

    /// Drops every note currently tagged `tag` and puts `replacements` in
    /// front of the survivors. Returns how many notes were dropped.
    pub(crate) fn replace_tagged(&mut self, tag: &str, replacements: Vec<Note>) -> usize {
        let before = self.notes.len();
        let survivors: Vec<Note> = self
            .notes
            .drain(..)
            .filter(|note| !note.has_tag(tag))
            .collect();
        let removed = before - survivors.len();

        self.notes = replacements;
        self.notes.extend(survivors);
        self.recompute_tags();
        removed
    }

    fn recompute_tags(&mut self) {
        self.tags = collect_tags(&self.notes);
    }
}

impl Serialize for NotesCollection {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        PersistedNotesRef { notes: &self.notes }.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for NotesCollection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        PersistedNotes::deserialize(deserializer).map(|stored| Self::from_notes(stored.notes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn at(millis: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(millis).expect("valid timestamp")
    }

    fn note(title: &str, tags: &[&str], millis: i64) -> Note {
        Note::new_at(
            title.to_string(),
            format!("{title} body"),
            tags.iter().map(|t| t.to_string()).collect(),
            at(millis),
        )
    }

    #[test]
    fn revise_archives_previous_state() {
        let original = note("Trip", &["travel"], 1_000);
        let id = original.id.clone();
        let mut collection = NotesCollection::from_notes(vec![original]);

        let changed = collection.revise(
            &id,
            "Trip".into(),
            "Packing list v2".into(),
            vec!["Travel".into(), "Summer".into()],
            at(2_000),
        );
        assert!(changed);

        let revised = collection.get(&id).expect("note still present");
        assert_eq!(revised.content, "Packing list v2");
        assert_eq!(revised.tags, vec!["travel", "summer"]);
        assert_eq!(revised.updated_at, at(2_000));
        assert_eq!(revised.created_at, at(1_000));
        assert_eq!(revised.versions.len(), 1);
        assert_eq!(revised.versions[0].content, "Trip body");
        assert_eq!(revised.versions[0].updated_at, at(1_000));
        assert_eq!(collection.tags(), ["summer", "travel"]);
    }

    #[test]
    fn revise_with_stalled_clock_still_moves_forward() {
        let original = note("a", &[], 5_000);
        let id = original.id.clone();
        let mut collection = NotesCollection::from_notes(vec![original]);

        collection.revise(&id, "b".into(), "b".into(), Vec::<String>::new(), at(5_000));
        collection.revise(&id, "c".into(), "c".into(), Vec::<String>::new(), at(4_000));

        let revised = collection.get(&id).expect("note present");
        assert_eq!(revised.versions[0].updated_at, at(5_000));
        assert_eq!(revised.versions[1].updated_at, at(5_000) + TimeDelta::milliseconds(1));
        assert!(revised.updated_at > revised.versions[1].updated_at);
    }

    #[test]
    fn revise_unknown_id_is_noop() {
        let mut collection = NotesCollection::from_notes(vec![note("a", &["x"], 1)]);
        let before = collection.clone();

        assert!(!collection.revise("missing", "t".into(), "c".into(), vec!["y".to_string()], at(9)));
        assert_eq!(collection, before);
    }

    #[test]
    fn remove_drops_note_and_its_tags() {
        let keep = note("keep", &["shared"], 1);
        let gone = note("gone", &["shared", "only-here"], 2);
        let gone_id = gone.id.clone();
        let mut collection = NotesCollection::from_notes(vec![gone, keep]);

        let removed = collection.remove(&gone_id).expect("note removed");
        assert_eq!(removed.title, "gone");
        assert!(collection.get(&gone_id).is_none());
        assert_eq!(collection.tags(), ["shared"]);
        assert!(collection.remove(&gone_id).is_none());
    }

    #[test]
    fn replace_tagged_keeps_untagged_notes_after_replacements() {
        let old = note("Old Tutorial", &["tutorial"], 1);
        let work = note("Standup", &["work"], 2);
        let work_id = work.id.clone();
        let mut collection = NotesCollection::from_notes(vec![work, old]);

        let removed = collection.replace_tagged("tutorial", vec![note("New Tutorial", &["tutorial"], 3)]);
        assert_eq!(removed, 1);

        let titles: Vec<_> = collection.notes().iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["New Tutorial", "Standup"]);
        assert_eq!(collection.notes()[1].id, work_id);
    }

    #[test]
    fn stored_tags_field_is_ignored_and_recomputed() {
        let raw = r#"{
            "notes": [{
                "id": "1",
                "title": "t",
                "content": "c",
                "tags": [" Work", "work", "HOME"],
                "createdAt": 1,
                "updatedAt": 1,
                "versions": []
            }],
            "tags": ["stale", "entries"]
        }"#;

        let collection: NotesCollection = serde_json::from_str(raw).expect("collection parses");
        assert_eq!(collection.tags(), ["home", "work"]);
        assert_eq!(collection.notes()[0].tags, vec!["work", "home"]);

        let written = serde_json::to_value(&collection).expect("collection serializes");
        assert!(written.get("tags").is_none());
        assert_eq!(written["notes"][0]["id"], "1");
    }
}
