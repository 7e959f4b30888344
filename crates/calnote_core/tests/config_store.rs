mod common;

use calnote_core::settings::schema::LocaleOverride;
use calnote_core::{
    ConfigError, ConfigStore, MemoryPersistence, Settings, SettingsPatch, SettingsPersistence,
    SqliteSettingsStore, Subscription,
};
use common::FlakyPersistence;
use serde_json::json;
use std::num::NonZeroU32;
use std::sync::{Arc, Mutex};

fn counting_listener<P: SettingsPersistence>(
    store: &ConfigStore<P>,
) -> (Arc<Mutex<Vec<Settings>>>, Subscription) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let subscription = store.subscribe(move |settings| sink.lock().unwrap().push(settings.clone()));
    (seen, subscription)
}

#[tokio::test]
async fn patch_replaces_one_field_and_notifies_once() {
    let store = ConfigStore::new(MemoryPersistence::new());
    let (seen, _subscription) = counting_listener(&store);
    assert_eq!(seen.lock().unwrap().len(), 1);

    let updated = store
        .patch(|_| SettingsPatch {
            words_per_dot: Some(NonZeroU32::new(300)),
            ..SettingsPatch::default()
        })
        .await
        .unwrap();

    let expected = Settings {
        words_per_dot: NonZeroU32::new(300),
        ..Settings::default()
    };
    assert_eq!(*updated, expected);
    assert_eq!(*store.get(), expected);
    assert_eq!(store.version(), 1);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[1], expected);
    assert_eq!(store.persistence().stored().unwrap()["wordsPerDot"], json!(300));
}

#[tokio::test]
async fn overlapping_patches_apply_in_call_order() {
    let store = ConfigStore::new(FlakyPersistence::healthy());
    let append = |suffix: &'static str| {
        move |current: &Settings| SettingsPatch {
            weekly_note_format: Some(format!("{}{suffix}", current.weekly_note_format)),
            ..SettingsPatch::default()
        }
    };

    let (first, second) = tokio::join!(store.patch(append("a")), store.patch(append("b")));

    assert_eq!(first.unwrap().weekly_note_format, "a");
    assert_eq!(second.unwrap().weekly_note_format, "ab");
    assert_eq!(store.version(), 2);
    let saved = store.persistence().saved();
    assert_eq!(saved.len(), 2);
    assert_eq!(saved[1]["weeklyNoteFormat"], json!("ab"));
}

#[tokio::test]
async fn failed_save_keeps_new_value_in_memory() {
    let store = ConfigStore::new(FlakyPersistence::failing_saves());
    let (seen, _subscription) = counting_listener(&store);

    let err = store
        .patch(|_| SettingsPatch {
            show_tasks: Some(false),
            ..SettingsPatch::default()
        })
        .await
        .unwrap_err();

    assert!(matches!(err, ConfigError::Persist(_)));
    assert!(!store.get().show_tasks);
    assert_eq!(seen.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn hydrate_merges_persisted_values_over_defaults() {
    let store = ConfigStore::new(MemoryPersistence::with_blob(json!({
        "wordsPerDot": 300,
        "showTasks": false,
        "weeklyNoteFolder": 5,
        "localeOverride": "de",
        "retiredKey": true
    })));

    let hydrated = store.hydrate().await.unwrap();

    assert_eq!(hydrated.words_per_dot, NonZeroU32::new(300));
    assert!(!hydrated.show_tasks);
    assert_eq!(hydrated.weekly_note_folder, "");
    assert_eq!(
        hydrated.locale_override,
        LocaleOverride::Explicit("de".to_string())
    );
    assert!(hydrated.should_confirm_before_create);
    assert_eq!(store.version(), 1);

    let stored = store.persistence().stored().unwrap();
    assert_eq!(stored["shouldConfirmBeforeCreate"], json!(true));
    assert!(stored.get("retiredKey").is_none());
}

#[tokio::test]
async fn hydrate_load_failure_keeps_defaults_and_storage() {
    let store = ConfigStore::new(FlakyPersistence::failing_loads());

    let err = store.hydrate().await.unwrap_err();

    assert!(matches!(err, ConfigError::Persist(_)));
    assert_eq!(*store.get(), Settings::default());
    assert_eq!(store.version(), 0);
    assert!(store.persistence().saved().is_empty());
}

#[tokio::test]
async fn dropped_subscription_stops_notifications() {
    let store = ConfigStore::new(MemoryPersistence::new());
    let (seen, subscription) = counting_listener(&store);
    let (_other, other_subscription) = counting_listener(&store);
    drop(subscription);

    store
        .patch(|_| SettingsPatch {
            show_streaks: Some(false),
            ..SettingsPatch::default()
        })
        .await
        .unwrap();

    assert_eq!(seen.lock().unwrap().len(), 1);
    assert_eq!(store.listener_count(), 1);
    store.release();
    assert_eq!(store.listener_count(), 0);
    drop(other_subscription);
}

#[tokio::test]
async fn sqlite_store_round_trips_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.sqlite3");

    let store = ConfigStore::new(SqliteSettingsStore::open(&path).unwrap());
    store.hydrate().await.unwrap();
    store
        .patch(|_| SettingsPatch::words_per_dot_input("120"))
        .await
        .unwrap();
    drop(store);

    let reopened = ConfigStore::new(SqliteSettingsStore::open(&path).unwrap());
    let hydrated = reopened.hydrate().await.unwrap();
    assert_eq!(hydrated.effective_words_per_dot(), 120);
}
