//! Read-only navigation through a note's version history.
//!
//! A cursor is either on the live note or on one stored version. Stepping
//! `Prev` walks toward the oldest version, `Next` walks back toward the live
//! note. Nothing here mutates a note; restoring an old version goes through
//! the normal update path and is therefore a copy-forward.

use chrono::{DateTime, Utc};

use crate::{Note, StepDirection};

/// Where a history cursor points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HistoryPosition {
    /// The note's current fields.
    #[default]
    Live,
    /// `versions[index]`, where 0 is the oldest.
    Version(usize),
}

impl HistoryPosition {
    /// The conventional numeric form: -1 for live, otherwise the version index.
    pub fn as_index(self) -> i64 {
        match self {
            HistoryPosition::Live => -1,
            HistoryPosition::Version(index) => index as i64,
        }
    }
}

/// A borrowed view of one state of a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Revision<'a> {
    pub title: &'a str,
    pub content: &'a str,
    pub tags: &'a [String],
    pub updated_at: DateTime<Utc>,
}

/// Moves a history cursor one step.
///
/// A cursor on a version the note does not have stays where it is.
pub fn step(note: &Note, position: HistoryPosition, direction: StepDirection) -> HistoryPosition {
    let count = note.versions.len();

    match (position, direction) {
        (HistoryPosition::Version(index), _) if index >= count => position,
        (HistoryPosition::Live, StepDirection::Prev) => match count.checked_sub(1) {
            Some(newest) => HistoryPosition::Version(newest),
            None => HistoryPosition::Live,
        },
        (HistoryPosition::Live, StepDirection::Next) => HistoryPosition::Live,
        (HistoryPosition::Version(index), StepDirection::Prev) => {
            HistoryPosition::Version(index.saturating_sub(1))
        }
        (HistoryPosition::Version(index), StepDirection::Next) => match index.checked_add(1) {
            Some(next) if next < count => HistoryPosition::Version(next),
            _ => HistoryPosition::Live,
        },
    }
}

/// Resolves a cursor to the fields it points at.
///
/// Returns `None` when `position` names a version the note does not have.
pub fn resolve(note: &Note, position: HistoryPosition) -> Option<Revision<'_>> {
    match position {
        HistoryPosition::Live => Some(Revision {
            title: &note.title,
            content: &note.content,
            tags: &note.tags,
            updated_at: note.updated_at,
        }),
        HistoryPosition::Version(index) => note.versions.get(index).map(|version| Revision {
            title: &version.title,
            content: &version.content,
            tags: &version.tags,
            updated_at: version.updated_at,
        }),
    }
}

/// Every state of `note`, newest first, starting with the live fields.
pub fn timeline(note: &Note) -> Vec<(HistoryPosition, Revision<'_>)> {
    let mut entries = Vec::with_capacity(note.versions.len() + 1);
    let mut position = HistoryPosition::Live;
    loop {
        if let Some(revision) = resolve(note, position) {
            entries.push((position, revision));
        }
        let previous = step(note, position, StepDirection::Prev);
        if previous == position {
            break;
        }
        position = previous;
    }
    entries
}
