use std::sync::Arc;

use chrono::DateTime;
use halpnotes::{
    filter, normalize_tag, step, BackgroundSaver, Config, HistoryPosition, JsonFileAdapter,
    ManualClock, MemoryAdapter, NoteStore, PersistenceAdapter, StepDirection,
};
use tempfile::TempDir;

fn clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(
        DateTime::from_timestamp_millis(1_700_000_000_000).expect("valid timestamp"),
    ))
}

fn blank_config() -> Config {
    Config {
        seed_defaults_on_first_run: false,
        ..Config::default()
    }
}

fn open(slot: &Arc<MemoryAdapter>, clock: &Arc<ManualClock>) -> NoteStore {
    NoteStore::open_with_clock(&blank_config(), Box::new(slot.clone()), clock.clone())
}

#[test]
fn trip_note_lifecycle() {
    let slot = Arc::new(MemoryAdapter::new());
    let clock = clock();
    let mut store = open(&slot, &clock);

    let id = store.add_note("Trip", "Packing list", ["Travel", " travel "]).notes()[0]
        .id
        .clone();
    let original = store.get_note(&id).expect("note added").clone();
    assert_eq!(original.tags, vec!["travel"]);
    assert!(original.versions.is_empty());

    clock.advance_millis(1_000);
    store.update_note(&id, "Trip", "Rewritten for the beach", ["travel"]);
    let updated = store.get_note(&id).expect("note present");
    assert_eq!(updated.versions.len(), 1);
    assert_eq!(updated.versions[0].title, "Trip");
    assert_eq!(updated.versions[0].content, "Packing list");
    assert_eq!(updated.content, "Rewritten for the beach");
    assert_eq!(updated.versions[0].tags, vec!["travel"]);
    assert_eq!(updated.versions[0].updated_at, original.updated_at);
    assert!(updated.updated_at > original.updated_at);

    let found = store.filter("packing list", Vec::<String>::new());
    assert!(found.iter().any(|n| n.id == id));

    store.delete_note(&id);
    assert!(!store.filter("", Vec::<String>::new()).iter().any(|n| n.id == id));
    assert!(!store.tags().iter().any(|t| t == "travel"));
}

#[test]
fn restore_defaults_keeps_user_notes() {
    let slot = Arc::new(MemoryAdapter::new());
    let clock = clock();
    let mut store = open(&slot, &clock);

    store.add_note("Old Tutorial", "outdated", ["tutorial"]);
    let work_id = store.add_note("Standup", "Yesterday/today", ["work"]).notes()[0]
        .id
        .clone();

    let collection = store.restore_defaults();
    assert!(!collection.notes().iter().any(|n| n.title == "Old Tutorial"));
    assert_eq!(
        collection.notes().iter().filter(|n| n.has_tag("tutorial")).count(),
        3
    );
    let work = collection.get(&work_id).expect("user note survives");
    assert_eq!(work.tags, vec!["work"]);
}

#[test]
fn stepping_back_from_live() {
    let slot = Arc::new(MemoryAdapter::new());
    let clock = clock();
    let mut store = open(&slot, &clock);

    let id = store.add_note("v0", "c", ["x"]).notes()[0].id.clone();
    for i in 1..=3 {
        clock.advance_millis(10);
        store.update_note(&id, format!("v{i}"), "c", ["x"]);
    }
    let note = store.get_note(&id).expect("note present");
    assert_eq!(note.versions.len(), 3);

    assert_eq!(
        step(note, HistoryPosition::Live, StepDirection::Prev),
        HistoryPosition::Version(2)
    );
    assert_eq!(
        step(note, HistoryPosition::Version(0), StepDirection::Prev),
        HistoryPosition::Version(0)
    );
}

#[test]
fn normalizing_twice_changes_nothing() {
    for raw in ["  Travel ", "WORK", "", "   ", "mixed Case tag", "ümlaut", "\tTab\n"] {
        let once = normalize_tag(raw);
        assert_eq!(normalize_tag(&once), once, "input {raw:?}");
    }
}

#[test]
fn versions_grow_in_order_with_every_update() {
    let slot = Arc::new(MemoryAdapter::new());
    let clock = clock();
    let mut store = open(&slot, &clock);
    let id = store.add_note("t", "c", ["a"]).notes()[0].id.clone();

    for n in 1..=6 {
        // Same-millisecond updates still need ordered stamps.
        if n % 2 == 0 {
            clock.advance_millis(3);
        }
        store.update_note(&id, format!("t{n}"), format!("c{n}"), ["a"]);

        let note = store.get_note(&id).expect("note present");
        assert_eq!(note.versions.len(), n);
        assert!(note
            .versions
            .windows(2)
            .all(|pair| pair[0].updated_at <= pair[1].updated_at));
    }
}

#[test]
fn tag_index_tracks_current_tags_only() {
    let slot = Arc::new(MemoryAdapter::new());
    let clock = clock();
    let mut store = open(&slot, &clock);

    let a = store.add_note("a", "c", ["One", "two"]).notes()[0].id.clone();
    let b = store.add_note("b", "c", ["two", "Three"]).notes()[0].id.clone();
    assert_eq!(store.tags(), ["one", "three", "two"]);

    clock.advance_millis(1);
    store.update_note(&a, "a", "c", ["four"]);
    assert_eq!(store.tags(), ["four", "three", "two"]);

    store.delete_note(&b);
    assert_eq!(store.tags(), ["four"]);

    let reloaded = open(&slot, &clock);
    assert_eq!(reloaded.tags(), ["four"]);
    assert_eq!(reloaded.collection(), store.collection());
}

#[test]
fn filter_is_repeatable() {
    let slot = Arc::new(MemoryAdapter::new());
    let clock = clock();
    let mut store = open(&slot, &clock);
    for i in 0..5 {
        store.add_note(format!("Recipe {i}"), "pasta night", ["food"]);
    }

    let first: Vec<String> = filter(store.notes(), "PASTA", ["Food"])
        .into_iter()
        .map(|n| n.id.clone())
        .collect();
    let second: Vec<String> = filter(store.notes(), "PASTA", ["Food"])
        .into_iter()
        .map(|n| n.id.clone())
        .collect();
    assert_eq!(first.len(), 5);
    assert_eq!(first, second);
}

#[test]
fn json_file_slot_survives_restart() {
    let dir = TempDir::new().expect("temp dir");
    let config = Config {
        data_dir: dir.path().to_path_buf(),
        ..Config::default()
    };
    let adapter = || -> Box<dyn PersistenceAdapter> {
        Box::new(JsonFileAdapter::new(&config.data_dir, &config.storage_key))
    };

    let mut store = NoteStore::open_with_clock(&config, adapter(), clock());
    assert_eq!(store.notes().len(), 43);
    let id = store.add_note("Mine", "kept", ["Personal"]).notes()[0]
        .id
        .clone();
    store.shutdown().expect("clean shutdown");

    let reopened = NoteStore::open_with_clock(&config, adapter(), clock());
    assert_eq!(reopened.notes().len(), 44);
    assert_eq!(reopened.notes()[0].id, id);
    assert!(reopened.tags().iter().any(|t| t == "personal"));
}

#[tokio::test]
async fn background_saves_land_in_the_slot() {
    let slot = Arc::new(MemoryAdapter::new());
    let saver = BackgroundSaver::start(slot.clone()).expect("saver starts");

    let mut store = NoteStore::open_with_clock(&blank_config(), Box::new(saver.clone()), clock());
    for i in 0..10 {
        store.add_note(format!("n{i}"), "c", ["bulk"]);
    }
    store.shutdown().expect("store shuts down");
    saver.shutdown().await.expect("saver shuts down");

    let saved = slot.load().expect("slot readable").expect("slot filled");
    assert_eq!(saved.len(), 10);
    assert_eq!(saved.notes()[0].title, "n9");
}
