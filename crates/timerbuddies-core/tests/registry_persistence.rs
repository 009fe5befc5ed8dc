//! Presets and saved images survive a restart through the SQLite store.

use std::sync::Arc;

use timerbuddies_core::{Config, PersistentStore, SqliteStore, TimerBuddies};

fn open_store(dir: &tempfile::TempDir) -> Arc<dyn PersistentStore> {
    Arc::new(SqliteStore::open(dir.path().join("timerbuddies.db")).unwrap())
}

#[tokio::test]
async fn presets_and_images_reload_after_restart() {
    let dir = tempfile::tempdir().unwrap();
    let preset_id = {
        let app = TimerBuddies::open(open_store(&dir), &Config::default());
        app.images().add("https://img/cat").unwrap();
        app.images().add("https://img/dog").unwrap();
        app.presets()
            .save("Homework", 600, Some("https://img/cat".into()))
            .unwrap()
            .id
    };

    let app = TimerBuddies::open(open_store(&dir), &Config::default());
    assert_eq!(app.images().list(), ["https://img/dog", "https://img/cat"]);

    let presets = app.presets().list();
    assert_eq!(presets.len(), 1);
    assert_eq!(presets[0].id, preset_id);
    assert_eq!(presets[0].name, "Homework");
    assert_eq!(presets[0].seconds, 600);

    app.presets().delete(&preset_id).unwrap();
    drop(app);

    let app = TimerBuddies::open(open_store(&dir), &Config::default());
    assert!(app.presets().list().is_empty());
}

#[tokio::test]
async fn twenty_one_saves_keep_twenty_newest() {
    let dir = tempfile::tempdir().unwrap();
    let app = TimerBuddies::open(open_store(&dir), &Config::default());
    for i in 1..=21 {
        app.images().add(&format!("https://img/{i}")).unwrap();
    }

    let list = app.images().list();
    assert_eq!(list.len(), 20);
    assert_eq!(list[0], "https://img/21");
    assert!(!list.iter().any(|i| i == "https://img/1"));
}

#[tokio::test]
async fn corrupt_presets_do_not_block_startup() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    store.put_atomic("timer_presets", "[{\"id\": 5").unwrap();
    store.put_atomic("saved_images", "a.png").unwrap();

    let app = TimerBuddies::open(store, &Config::default());
    assert!(app.presets().list().is_empty());
    assert_eq!(app.images().list(), ["a.png"]);
}
