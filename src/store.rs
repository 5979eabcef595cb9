use std::sync::Arc;

use log::{debug, error, info, warn};

use crate::{
    filter, first_run_notes, normalize_tag, resolve, tutorial_notes, Clock, Config,
    HistoryPosition, Note, NotesCollection, NotesError, PersistenceAdapter, Result, SystemClock,
};

/// Owns the note collection and keeps the persistence slot in step with it.
///
/// Every mutation recomputes the tag index and then hands a snapshot to the
/// persistence adapter. A failed save is logged and remembered but never
/// undoes or blocks the mutation.
pub struct NoteStore {
    /// The live collection
    collection: NotesCollection,

    /// Where snapshots go after each mutation
    persistence: Box<dyn PersistenceAdapter>,

    /// Time source for created/updated stamps
    clock: Arc<dyn Clock>,

    /// Normalized tag marking notes that `restore_defaults` replaces
    reserved_tag: String,

    /// Set when the stored slot could not be read, so it is not overwritten
    saves_suspended: bool,

    /// Most recent persistence failure not yet collected by the caller
    persistence_error: Option<NotesError>,

    /// Set while the slot lags behind the in-memory collection
    unsaved_changes: bool,
}

impl NoteStore {
    /// Loads the store from `persistence` using the system clock.
    pub fn open(config: &Config, persistence: Box<dyn PersistenceAdapter>) -> Self {
        Self::open_with_clock(config, persistence, Arc::new(SystemClock))
    }

    /// Loads the store from `persistence`.
    ///
    /// An empty slot is seeded with the first-run notes when the config asks
    /// for it. An unreadable slot leaves the store empty and suspends saving
    /// so the stored data is not clobbered; the error is kept for
    /// [`NoteStore::take_persistence_error`].
    pub fn open_with_clock(
        config: &Config,
        persistence: Box<dyn PersistenceAdapter>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let reserved_tag = normalize_tag(&config.reserved_tag);
        let mut store = Self {
            collection: NotesCollection::new(),
            persistence,
            clock,
            reserved_tag,
            saves_suspended: false,
            persistence_error: None,
            unsaved_changes: false,
        };

        match store.persistence.load() {
            Ok(Some(collection)) => {
                info!(
                    "Opened note store with {} notes and {} tags",
                    collection.len(),
                    collection.tags().len()
                );
                store.collection = collection;
            }
            Ok(None) if config.seed_defaults_on_first_run => {
                info!("No saved notes found, seeding defaults");
                let notes =
                    first_run_notes(&store.reserved_tag, store.clock.now(), &mut rand::thread_rng());
                store.collection = NotesCollection::from_notes(notes);
                store.persist();
            }
            Ok(None) => {
                info!("No saved notes found, starting empty");
            }
            Err(e) => {
                error!("Failed to load notes, continuing in memory only: {}", e);
                store.saves_suspended = true;
                store.persistence_error = Some(e);
            }
        }

        store
    }

    /// The current collection state.
    pub fn collection(&self) -> &NotesCollection {
        &self.collection
    }

    pub fn notes(&self) -> &[Note] {
        self.collection.notes()
    }

    pub fn tags(&self) -> &[String] {
        self.collection.tags()
    }

    pub fn get_note(&self, id: &str) -> Option<&Note> {
        self.collection.get(id)
    }

    pub fn reserved_tag(&self) -> &str {
        &self.reserved_tag
    }

    /// Creates a note and puts it at the front of the collection.
    pub fn add_note<I, S>(
        &mut self,
        title: impl Into<String>,
        content: impl Into<String>,
        raw_tags: I,
    ) -> &NotesCollection
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tags = raw_tags.into_iter().map(|t| t.as_ref().to_string()).collect();
        let note = Note::new_at(title.into(), content.into(), tags, self.clock.now());
        info!("Adding note {}", note.id);

        self.collection.prepend(note);
        self.persist();
        &self.collection
    }

    /// Replaces a note's fields, archiving its previous state.
    ///
    /// An unknown `id` leaves everything unchanged.
    pub fn update_note<I, S>(
        &mut self,
        id: &str,
        title: impl Into<String>,
        content: impl Into<String>,
        raw_tags: I,
    ) -> &NotesCollection
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if let Err(e) = self.try_update_note(id, title, content, raw_tags) {
            debug!("Ignoring update: {}", e);
        }
        &self.collection
    }

    /// Like [`NoteStore::update_note`], but reports an unknown `id`.
    pub fn try_update_note<I, S>(
        &mut self,
        id: &str,
        title: impl Into<String>,
        content: impl Into<String>,
        raw_tags: I,
    ) -> Result<&Note>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tags = raw_tags.into_iter().map(|t| t.as_ref().to_string()).collect();
        let now = self.clock.now();
        if !self
            .collection
            .revise(id, title.into(), content.into(), tags, now)
        {
            return Err(NotesError::NoteNotFound { id: id.to_string() });
        }

        info!("Updated note {}", id);
        self.persist();
        self.collection
            .get(id)
            .ok_or_else(|| NotesError::NoteNotFound { id: id.to_string() })
    }

    /// Removes a note and its entire history. An unknown `id` is a no-op.
    pub fn delete_note(&mut self, id: &str) -> &NotesCollection {
        if let Err(e) = self.try_delete_note(id) {
            debug!("Ignoring delete: {}", e);
        }
        &self.collection
    }

    /// Like [`NoteStore::delete_note`], but returns the removed note or
    /// reports an unknown `id`.
    pub fn try_delete_note(&mut self, id: &str) -> Result<Note> {
        let removed = self
            .collection
            .remove(id)
            .ok_or_else(|| NotesError::NoteNotFound { id: id.to_string() })?;

        info!(
            "Deleted note {} with {} prior versions",
            id,
            removed.versions.len()
        );
        self.persist();
        Ok(removed)
    }

    /// Swaps every note carrying the reserved tag for a fresh tutorial set.
    pub fn restore_defaults(&mut self) -> &NotesCollection {
        let defaults = tutorial_notes(&self.reserved_tag, self.clock.now());
        let restored = defaults.len();
        let removed = self.collection.replace_tagged(&self.reserved_tag, defaults);
        info!(
            "Restored {} default notes (replaced {} tagged '{}')",
            restored, removed, self.reserved_tag
        );

        self.persist();
        &self.collection
    }

    /// Saves the fields of `versions[index]` as the note's new live state.
    ///
    /// The state that was live before becomes a new version; nothing is
    /// removed from history.
    pub fn revert_to_version(&mut self, id: &str, index: usize) -> Result<&Note> {
        let note = self
            .collection
            .get(id)
            .ok_or_else(|| NotesError::NoteNotFound { id: id.to_string() })?;
        let revision = resolve(note, HistoryPosition::Version(index)).ok_or_else(|| {
            NotesError::VersionNotFound {
                id: id.to_string(),
                index,
            }
        })?;

        let title = revision.title.to_string();
        let content = revision.content.to_string();
        let tags = revision.tags.to_vec();
        debug!("Reverting note {} to version {}", id, index);
        self.try_update_note(id, title, content, tags)
    }

    /// Notes matching `search_query` and carrying every tag in `required_tags`.
    pub fn filter<I, S>(&self, search_query: &str, required_tags: I) -> Vec<&Note>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        filter(self.collection.notes(), search_query, required_tags)
    }

    /// Returns and clears the last persistence failure.
    pub fn take_persistence_error(&mut self) -> Option<NotesError> {
        self.persistence_error.take()
    }

    /// Writes a final snapshot if the slot is behind, then releases the store.
    pub fn shutdown(mut self) -> Result<()> {
        info!("Shutting down note store...");
        if self.saves_suspended {
            warn!("Skipping final save: stored notes could not be read at startup");
            return match self.persistence_error.take() {
                Some(e) => Err(e),
                None => Ok(()),
            };
        }

        if !self.unsaved_changes {
            debug!("Slot is up to date, skipping final save");
            return Ok(());
        }

        self.persistence.save(&self.collection).map_err(|e| {
            error!("Final save failed: {}", e);
            e
        })?;
        info!("Note store shutdown complete");
        Ok(())
    }

    fn persist(&mut self) {
        if self.saves_suspended {
            debug!("Saves suspended, keeping change in memory only");
            return;
        }

        match self.persistence.save(&self.collection) {
            Ok(()) => self.unsaved_changes = false,
            Err(e) => {
                warn!("Failed to persist notes: {}", e);
                self.unsaved_changes = true;
                self.persistence_error = Some(e);
            }
        }
    }
}
