//! View/filter preference persistence with legacy-key migration.
//!
//! Reads prefer the current-format key; when it is absent the legacy keys
//! (one for view mode, one for filters) are consulted through an explicit
//! migration table. Every save writes the current key and mirrors the
//! filters back to the legacy filter key so pre-migration readers keep
//! observing consistent data.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::models::{AgendaFilters, PreferencePatch, ViewMode, ViewPreference};
use crate::storage::{KeyValueStorage, MemoryStorage};

pub const PREFS_KEY: &str = "clinic.agenda.preferences";
pub const LEGACY_VIEW_MODE_KEY: &str = "agenda_modo";
pub const LEGACY_FILTERS_KEY: &str = "agenda_filtros";

/// Loose decode target for whatever is in storage. Unknown view modes and
/// missing fields normalize instead of failing the whole read.
#[derive(Debug, Default, Deserialize)]
struct StoredPreference {
    #[serde(rename = "modo", alias = "view_mode", default)]
    modo: Option<String>,
    #[serde(rename = "filtros", alias = "filters", default)]
    filtros: Option<AgendaFilters>,
}

type MigrateFn = fn(&str, &mut StoredPreference);

/// Legacy keys and how each contributes to the synthesized value.
/// Consulted only when the canonical key is absent or unreadable.
const LEGACY_MIGRATIONS: &[(&str, MigrateFn)] = &[
    (LEGACY_VIEW_MODE_KEY, migrate_legacy_view_mode),
    (LEGACY_FILTERS_KEY, migrate_legacy_filters),
];

fn migrate_legacy_view_mode(raw: &str, stored: &mut StoredPreference) {
    // The old UI wrote the bare label; some builds JSON-quoted it.
    let label = serde_json::from_str::<String>(raw).unwrap_or_else(|_| raw.to_string());
    stored.modo = Some(label);
}

fn migrate_legacy_filters(raw: &str, stored: &mut StoredPreference) {
    match serde_json::from_str::<AgendaFilters>(raw) {
        Ok(filters) => stored.filtros = Some(filters),
        Err(e) => debug!("Ignoring unreadable legacy filters: {}", e),
    }
}

pub struct PreferenceStore {
    storage: Arc<dyn KeyValueStorage>,
}

impl PreferenceStore {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }

    /// Store backed by a volatile map, for hosts without durable storage.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// Load the persisted preference, always fully populated.
    ///
    /// Storage failures degrade to the default value; they are never
    /// propagated.
    pub fn load(&self) -> ViewPreference {
        normalize(self.read_stored())
    }

    /// Merge `patch` onto the current value, persist, and return the
    /// result. Untouched fields keep their previous values.
    pub fn save(&self, patch: PreferencePatch) -> ViewPreference {
        let mut current = self.load();

        if let Some(mode) = patch.view_mode {
            current.view_mode = mode;
        }
        if let Some(name) = patch.name_filter {
            current.filters.name = name;
        }
        if let Some(status) = patch.status_filter {
            current.filters.status = status;
        }

        self.write_through(&current);
        current
    }

    /// Reset both filters to empty strings. The keys stay in storage.
    pub fn clear_filters(&self) -> ViewPreference {
        self.save(PreferencePatch {
            name_filter: Some(String::new()),
            status_filter: Some(String::new()),
            ..PreferencePatch::default()
        })
    }

    fn read_stored(&self) -> StoredPreference {
        // Canonical key wins whenever it parses, even with empty filters;
        // legacy keys only fill in when it is absent or unreadable.
        match self.storage.get(PREFS_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<StoredPreference>(&raw) {
                Ok(stored) => return stored,
                Err(e) => warn!("Unreadable preference value, falling back to legacy keys: {}", e),
            },
            Ok(None) => {}
            Err(e) => warn!("Preference storage read failed: {}", e),
        }

        let mut stored = StoredPreference::default();
        for (key, migrate) in LEGACY_MIGRATIONS {
            match self.storage.get(key) {
                Ok(Some(raw)) => migrate(&raw, &mut stored),
                Ok(None) => {}
                Err(e) => warn!("Legacy preference key {} unreadable: {}", key, e),
            }
        }
        stored
    }

    fn write_through(&self, preference: &ViewPreference) {
        match serde_json::to_string(preference) {
            Ok(raw) => {
                if let Err(e) = self.storage.set(PREFS_KEY, &raw) {
                    warn!("Preference write failed: {}", e);
                }
            }
            Err(e) => warn!("Preference serialization failed: {}", e),
        }

        // Mirror the filters so pre-migration readers stay consistent.
        match serde_json::to_string(&preference.filters) {
            Ok(raw) => {
                if let Err(e) = self.storage.set(LEGACY_FILTERS_KEY, &raw) {
                    debug!("Legacy filter mirror write failed: {}", e);
                }
            }
            Err(e) => debug!("Legacy filter serialization failed: {}", e),
        }
    }
}

fn normalize(stored: StoredPreference) -> ViewPreference {
    ViewPreference {
        view_mode: stored
            .modo
            .as_deref()
            .map(ViewMode::parse)
            .unwrap_or_default(),
        filters: stored.filtros.unwrap_or_default(),
    }
}
