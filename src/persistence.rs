//! Durable storage for the note collection.
//!
//! The whole collection lives in a single slot and is always written as one
//! blob. Adapters only move bytes; the tag index is rebuilt on load by
//! [`NotesCollection`]'s deserializer.

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
    sync::Mutex,
};

use log::{debug, error, info, trace};
use tempfile::NamedTempFile;

use crate::{NotesCollection, NotesError, Result};

/// Loads and saves the full note collection.
pub trait PersistenceAdapter: Send + Sync {
    /// Returns the stored collection, or `None` when nothing was saved yet.
    fn load(&self) -> Result<Option<NotesCollection>>;

    /// Overwrites the stored collection.
    fn save(&self, collection: &NotesCollection) -> Result<()>;
}

/// Stores the collection as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct JsonFileAdapter {
    path: PathBuf,
}

impl JsonFileAdapter {
    pub fn new(dir: &Path, key: &str) -> Self {
        Self {
            path: dir.join(format!("{key}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PersistenceAdapter for JsonFileAdapter {
    fn load(&self) -> Result<Option<NotesCollection>> {
        if !self.path.exists() {
            info!("No saved notes at {}", self.path.display());
            return Ok(None);
        }

        debug!("Loading notes from {}", self.path.display());
        let raw = fs::read_to_string(&self.path).map_err(|e| {
            error!("Failed to read {}: {}", self.path.display(), e);
            NotesError::Io(e)
        })?;
        let collection: NotesCollection = serde_json::from_str(&raw).map_err(|e| {
            error!("Failed to parse {}: {}", self.path.display(), e);
            NotesError::Serialization(e)
        })?;

        info!(
            "Loaded {} notes from {}",
            collection.len(),
            self.path.display()
        );
        Ok(Some(collection))
    }

    /// Writes to a temporary file next to the target and renames it into place.
    fn save(&self, collection: &NotesCollection) -> Result<()> {
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        if !dir.exists() {
            debug!("Creating data directory: {}", dir.display());
            fs::create_dir_all(dir).map_err(|e| {
                error!("Failed to create directory {}: {}", dir.display(), e);
                NotesError::DirectoryError {
                    path: dir.to_path_buf(),
                }
            })?;
        }

        trace!("Serializing {} notes", collection.len());
        let json = serde_json::to_string_pretty(collection)?;

        let mut temp_file = NamedTempFile::new_in(dir).map_err(|e| {
            error!("Failed to create temporary file: {}", e);
            NotesError::Io(e)
        })?;
        temp_file.write_all(json.as_bytes())?;
        temp_file.flush()?;

        temp_file.persist(&self.path).map_err(|e| {
            error!(
                "Failed to persist file {}: {}",
                self.path.display(),
                e.error
            );
            NotesError::Io(e.error)
        })?;

        debug!(
            "Saved {} notes to {}",
            collection.len(),
            self.path.display()
        );
        Ok(())
    }
}

/// An in-process slot holding the serialized collection.
#[derive(Debug, Default)]
pub struct MemoryAdapter {
    slot: Mutex<Option<String>>,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with `raw` already stored, as if written by an earlier session.
    pub fn with_contents(raw: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(raw.into())),
        }
    }

    /// The raw stored blob, if any.
    pub fn contents(&self) -> Option<String> {
        self.slot.lock().ok().and_then(|slot| slot.clone())
    }
}

impl PersistenceAdapter for MemoryAdapter {
    fn load(&self) -> Result<Option<NotesCollection>> {
        let slot = self
            .slot
            .lock()
            .map_err(|_| NotesError::PersistenceUnavailable {
                message: "memory slot lock poisoned".to_string(),
            })?;
        match slot.as_deref() {
            Some(raw) => Ok(Some(serde_json::from_str(raw)?)),
            None => Ok(None),
        }
    }

    fn save(&self, collection: &NotesCollection) -> Result<()> {
        let json = serde_json::to_string(collection)?;
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| NotesError::PersistenceUnavailable {
                message: "memory slot lock poisoned".to_string(),
            })?;
        *slot = Some(json);
        Ok(())
    }
}

impl<T: PersistenceAdapter + ?Sized> PersistenceAdapter for std::sync::Arc<T> {
    fn load(&self) -> Result<Option<NotesCollection>> {
        (**self).load()
    }

    fn save(&self, collection: &NotesCollection) -> Result<()> {
        (**self).save(collection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Note;
    use tempfile::TempDir;

    fn sample() -> NotesCollection {
        let mut note = Note::new("Trip".into(), "Packing list".into(), vec!["Travel".into()]);
        note.versions.push(note.current_version());
        NotesCollection::from_notes(vec![
            note,
            Note::new("Work".into(), "Standup".into(), vec!["work".into()]),
        ])
    }

    #[test]
    fn file_adapter_reports_absence_on_first_run() {
        let dir = TempDir::new().expect("temp dir");
        let adapter = JsonFileAdapter::new(dir.path(), "notes-app-data");
        assert!(adapter.load().expect("load succeeds").is_none());
    }

    #[test]
    fn file_adapter_restores_saved_collection() {
        let dir = TempDir::new().expect("temp dir");
        let adapter = JsonFileAdapter::new(&dir.path().join("nested"), "notes-app-data");
        let collection = sample();

        adapter.save(&collection).expect("save succeeds");
        assert!(adapter.path().ends_with("nested/notes-app-data.json"));

        let loaded = adapter
            .load()
            .expect("load succeeds")
            .expect("collection present");
        assert_eq!(loaded, collection);
        assert_eq!(loaded.tags(), ["travel", "work"]);
    }

    #[test]
    fn file_adapter_overwrites_previous_snapshot() {
        let dir = TempDir::new().expect("temp dir");
        let adapter = JsonFileAdapter::new(dir.path(), "slot");

        adapter.save(&sample()).expect("first save");
        adapter.save(&NotesCollection::new()).expect("second save");

        let loaded = adapter.load().expect("load").expect("present");
        assert!(loaded.is_empty());
        assert!(loaded.tags().is_empty());
    }

    #[test]
    fn file_adapter_rejects_corrupt_slot() {
        let dir = TempDir::new().expect("temp dir");
        let adapter = JsonFileAdapter::new(dir.path(), "slot");
        fs::write(adapter.path(), "{ not json").expect("write corrupt file");

        assert!(matches!(adapter.load(), Err(NotesError::Serialization(_))));
    }

    #[test]
    fn memory_adapter_stores_notes_only() {
        let adapter = MemoryAdapter::new();
        assert!(adapter.load().expect("load").is_none());

        adapter.save(&sample()).expect("save");
        let raw = adapter.contents().expect("slot filled");
        let value: serde_json::Value = serde_json::from_str(&raw).expect("valid json");
        assert!(value.get("tags").is_none());
        assert_eq!(value["notes"].as_array().map(Vec::len), Some(2));

        let loaded = adapter.load().expect("load").expect("present");
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.tags(), ["travel", "work"]);
    }
}
