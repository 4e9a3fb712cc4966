pub mod models;
pub mod storage;
pub mod store;

pub use models::{AgendaFilters, PreferencePatch, ViewMode, ViewPreference};
pub use storage::{JsonFileStorage, KeyValueStorage, MemoryStorage};
pub use store::{PreferenceStore, LEGACY_FILTERS_KEY, LEGACY_VIEW_MODE_KEY, PREFS_KEY};
