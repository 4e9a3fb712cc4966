use std::sync::Arc;

use anyhow::{anyhow, Result};
use serde_json::json;

use preference_cell::{
    JsonFileStorage, KeyValueStorage, MemoryStorage, PreferencePatch, PreferenceStore, ViewMode,
    LEGACY_FILTERS_KEY, LEGACY_VIEW_MODE_KEY, PREFS_KEY,
};

struct FailingStorage;

impl KeyValueStorage for FailingStorage {
    fn get(&self, _key: &str) -> Result<Option<String>> {
        Err(anyhow!("storage disabled"))
    }

    fn set(&self, _key: &str, _value: &str) -> Result<()> {
        Err(anyhow!("storage quota exceeded"))
    }

    fn remove(&self, _key: &str) -> Result<()> {
        Err(anyhow!("storage disabled"))
    }
}

#[test]
fn load_returns_defaults_on_empty_storage() {
    let store = PreferenceStore::in_memory();

    let pref = store.load();
    assert_eq!(pref.view_mode, ViewMode::Day);
    assert_eq!(pref.filters.name, "");
    assert_eq!(pref.filters.status, "");
}

#[test]
fn partial_patch_keeps_untouched_fields() {
    let store = PreferenceStore::in_memory();
    store.save(PreferencePatch::name_filter("Maria"));

    let before = store.load();
    store.save(PreferencePatch::status_filter("confirmado"));

    let after = store.load();
    assert_eq!(after.filters.name, before.filters.name);
    assert_eq!(after.filters.name, "Maria");
    assert_eq!(after.filters.status, "confirmado");
}

#[test]
fn save_round_trips_view_mode() {
    let store = PreferenceStore::in_memory();
    store.save(PreferencePatch::view_mode(ViewMode::Week));

    assert_eq!(store.load().view_mode, ViewMode::Week);
}

#[test]
fn legacy_keys_are_migrated_when_canonical_is_absent() {
    let storage = Arc::new(MemoryStorage::new());
    storage.set(LEGACY_VIEW_MODE_KEY, "semana").unwrap();
    storage
        .set(
            LEGACY_FILTERS_KEY,
            &json!({"nome": "Jose", "status": "atendido"}).to_string(),
        )
        .unwrap();

    let store = PreferenceStore::new(storage);
    let pref = store.load();

    assert_eq!(pref.view_mode, ViewMode::Week);
    assert_eq!(pref.filters.name, "Jose");
    assert_eq!(pref.filters.status, "atendido");
}

#[test]
fn json_quoted_legacy_view_mode_is_accepted() {
    let storage = Arc::new(MemoryStorage::new());
    storage.set(LEGACY_VIEW_MODE_KEY, "\"week\"").unwrap();

    let store = PreferenceStore::new(storage);
    assert_eq!(store.load().view_mode, ViewMode::Week);
}

#[test]
fn canonical_key_wins_even_with_empty_filters() {
    let storage = Arc::new(MemoryStorage::new());
    storage
        .set(
            PREFS_KEY,
            &json!({"modo": "day", "filtros": {"nome": "", "status": ""}}).to_string(),
        )
        .unwrap();
    storage
        .set(
            LEGACY_FILTERS_KEY,
            &json!({"nome": "stale legacy", "status": "cancelado"}).to_string(),
        )
        .unwrap();

    let store = PreferenceStore::new(storage);
    let pref = store.load();

    // A cleared canonical filter is a deliberate state, not an absence.
    assert_eq!(pref.filters.name, "");
    assert_eq!(pref.filters.status, "");
}

#[test]
fn save_mirrors_filters_to_legacy_key() {
    let storage = Arc::new(MemoryStorage::new());
    let store = PreferenceStore::new(storage.clone());

    store.save(PreferencePatch::name_filter("Ana"));

    let mirrored = storage.get(LEGACY_FILTERS_KEY).unwrap().unwrap();
    let mirrored: serde_json::Value = serde_json::from_str(&mirrored).unwrap();
    assert_eq!(mirrored["nome"], "Ana");
}

#[test]
fn unknown_stored_view_mode_normalizes_to_day() {
    let storage = Arc::new(MemoryStorage::new());
    storage
        .set(PREFS_KEY, &json!({"modo": "fortnight"}).to_string())
        .unwrap();

    let store = PreferenceStore::new(storage);
    assert_eq!(store.load().view_mode, ViewMode::Day);
}

#[test]
fn corrupt_canonical_value_falls_back_to_legacy() {
    let storage = Arc::new(MemoryStorage::new());
    storage.set(PREFS_KEY, "{not json").unwrap();
    storage.set(LEGACY_VIEW_MODE_KEY, "week").unwrap();

    let store = PreferenceStore::new(storage);
    assert_eq!(store.load().view_mode, ViewMode::Week);
}

#[test]
fn clear_filters_resets_to_empty_strings_without_removing_keys() {
    let storage = Arc::new(MemoryStorage::new());
    let store = PreferenceStore::new(storage.clone());
    store.save(PreferencePatch::name_filter("Maria"));

    let pref = store.clear_filters();

    assert_eq!(pref.filters.name, "");
    assert_eq!(pref.filters.status, "");
    assert!(storage.get(PREFS_KEY).unwrap().is_some());
    assert!(storage.get(LEGACY_FILTERS_KEY).unwrap().is_some());
}

#[test]
fn storage_failures_degrade_to_defaults() {
    let store = PreferenceStore::new(Arc::new(FailingStorage));

    let pref = store.load();
    assert_eq!(pref.view_mode, ViewMode::Day);

    // Saving against broken storage still returns the merged value.
    let saved = store.save(PreferencePatch::status_filter("confirmado"));
    assert_eq!(saved.filters.status, "confirmado");
}

#[test]
fn preferences_survive_reopen_with_file_storage() {
    let dir = tempfile::tempdir().unwrap();

    {
        let store = PreferenceStore::new(Arc::new(JsonFileStorage::new(dir.path())));
        store.save(PreferencePatch::view_mode(ViewMode::Week));
        store.save(PreferencePatch::name_filter("Carlos"));
    }

    let store = PreferenceStore::new(Arc::new(JsonFileStorage::new(dir.path())));
    let pref = store.load();
    assert_eq!(pref.view_mode, ViewMode::Week);
    assert_eq!(pref.filters.name, "Carlos");
}
