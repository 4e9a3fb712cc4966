use serde::{Deserialize, Serialize};

/// Active agenda view. Anything unrecognized in storage decodes as Day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Day,
    Week,
}

impl ViewMode {
    /// Total parser over stored labels, current and legacy ("semana" came
    /// from the pre-migration UI).
    pub fn parse(raw: &str) -> ViewMode {
        match raw.trim().to_lowercase().as_str() {
            "week" | "semana" => ViewMode::Week,
            _ => ViewMode::Day,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::Day => "day",
            ViewMode::Week => "week",
        }
    }
}

/// Active agenda filters. Persisted field names keep the historical
/// Portuguese keys so older readers stay compatible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AgendaFilters {
    #[serde(rename = "nome", alias = "name", default)]
    pub name: String,
    #[serde(default)]
    pub status: String,
}

/// Fully-populated, normalized preference value. `load()` never returns
/// anything partial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ViewPreference {
    #[serde(rename = "modo", alias = "view_mode", default)]
    pub view_mode: ViewMode,
    #[serde(rename = "filtros", alias = "filters", default)]
    pub filters: AgendaFilters,
}

/// Partial update merged onto the loaded value by `save`.
#[derive(Debug, Clone, Default)]
pub struct PreferencePatch {
    pub view_mode: Option<ViewMode>,
    pub name_filter: Option<String>,
    pub status_filter: Option<String>,
}

impl PreferencePatch {
    pub fn view_mode(mode: ViewMode) -> Self {
        Self {
            view_mode: Some(mode),
            ..Self::default()
        }
    }

    pub fn name_filter(name: impl Into<String>) -> Self {
        Self {
            name_filter: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn status_filter(status: impl Into<String>) -> Self {
        Self {
            status_filter: Some(status.into()),
            ..Self::default()
        }
    }
}
