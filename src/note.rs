//! Core data structures for the halpnotes application.
//!
//! A [`Note`] carries its live fields plus an append-only list of
//! [`NoteVersion`] snapshots, oldest first. The live fields act as the newest
//! version; there is no separate entry for them in `versions`.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{normalize_tags, truncate_to_millis};

/// Represents a single note in our system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Unique identifier for the note
    pub id: String,
    /// Note title
    pub title: String,
    /// Note body
    pub content: String,
    /// Normalized tags for organization
    #[serde(default)]
    pub tags: Vec<String>,
    /// When the note was created
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    /// Last modification time
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
    /// Prior states, oldest first
    #[serde(default)]
    pub versions: Vec<NoteVersion>,
}

/// An immutable snapshot of a note's state before an update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteVersion {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// The `updated_at` the note carried until this state was superseded
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// Creates a new note stamped with the current time.
    pub fn new(title: String, content: String, tags: Vec<String>) -> Self {
        Self::new_at(title, content, tags, truncate_to_millis(Utc::now()))
    }

    /// Creates a new note with `created_at` and `updated_at` both set to `now`.
    pub fn new_at(title: String, content: String, tags: Vec<String>, now: DateTime<Utc>) -> Self {
        Note {
            id: Uuid::new_v4().to_string(),
            title,
            content,
            tags: normalize_tags(tags),
            created_at: now,
            updated_at: now,
            versions: Vec::new(),
        }
    }

    /// Snapshot of the live fields, as they would be archived by an update.
    pub fn current_version(&self) -> NoteVersion {
        NoteVersion {
            title: self.title.clone(),
            content: self.content.clone(),
            tags: self.tags.clone(),
            updated_at: self.updated_at,
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_note_normalizes_tags_and_has_no_history() {
        let note = Note::new(
            "Trip".to_string(),
            "Packing list".to_string(),
            vec!["Travel".to_string(), " travel ".to_string()],
        );

        assert_eq!(note.tags, vec!["travel"]);
        assert!(note.versions.is_empty());
        assert_eq!(note.created_at, note.updated_at);
        assert!(Uuid::parse_str(&note.id).is_ok());
    }

    #[test]
    fn serializes_with_camel_case_and_millisecond_timestamps() {
        let at = DateTime::from_timestamp_millis(1_700_000_000_123).expect("valid timestamp");
        let note = Note::new_at("t".into(), "c".into(), vec!["x".into()], at);

        let value = serde_json::to_value(&note).expect("note serializes");
        assert_eq!(value["createdAt"], 1_700_000_000_123_i64);
        assert_eq!(value["updatedAt"], 1_700_000_000_123_i64);
        assert!(value["versions"].as_array().is_some_and(|v| v.is_empty()));
    }

    #[test]
    fn missing_versions_field_loads_as_empty_history() {
        let raw = r#"{
            "id": "1712345678901",
            "title": "Legacy",
            "content": "Saved before history existed",
            "tags": ["old"],
            "createdAt": 1712345678901,
            "updatedAt": 1712345678901
        }"#;

        let note: Note = serde_json::from_str(raw).expect("legacy note parses");
        assert_eq!(note.id, "1712345678901");
        assert!(note.versions.is_empty());
    }
}
