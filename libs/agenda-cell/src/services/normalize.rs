//! Raw payload → UI model normalization.
//!
//! The backend and the legacy import path produce different shapes for the
//! same entry; this module folds both into `AppointmentEntry`. The
//! constructor is total: every malformed field degrades to a documented
//! default (empty string, `Scheduled`, clamped duration) instead of
//! erroring, so one bad row can never blank a whole agenda.

use chrono::{Duration, NaiveDate, NaiveTime};
use serde_json::Value;
use uuid::Uuid;

use crate::models::{AppointmentEntry, EntryKind, RawAgendaEntry, RawSlotConfig, SlotGridConfig};
use crate::services::slots::{parse_entry_date, parse_time_of_day};
use crate::services::taxonomy::{fold_accents, normalize_status};

/// Synthetic display name for blocked time.
pub const BLOCK_DISPLAY_NAME: &str = "Blocked";

impl AppointmentEntry {
    /// Build a normalized entry from whatever the backend sent.
    pub fn from_raw(raw: &RawAgendaEntry) -> AppointmentEntry {
        let kind = classify_kind(raw.kind.as_deref());

        let start_time = raw
            .start_time
            .as_deref()
            .and_then(parse_time_of_day)
            .unwrap_or_else(midnight);
        let end_time = raw.end_time.as_deref().and_then(parse_time_of_day);

        // Durations are clamped to a minute even when upstream timestamps
        // are missing, equal, or inverted.
        let duration_minutes = end_time
            .map(|end| (end - start_time).num_minutes())
            .unwrap_or(0)
            .max(1);
        let end_time = start_time + Duration::minutes(duration_minutes);

        let date = raw
            .date
            .as_deref()
            .and_then(parse_entry_date)
            .or_else(|| raw.start_time.as_deref().and_then(parse_entry_date))
            .unwrap_or_else(epoch_date);

        let (patient_ref, display_name) = match kind {
            EntryKind::Block => (None, BLOCK_DISPLAY_NAME.to_string()),
            EntryKind::Appointment => (
                raw.patient_id.as_ref().and_then(value_to_string),
                raw.patient_name.clone().unwrap_or_default(),
            ),
        };

        AppointmentEntry {
            id: raw
                .id
                .as_ref()
                .and_then(value_to_string)
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            patient_ref,
            display_name,
            date,
            start_time,
            end_time,
            duration_minutes,
            status: normalize_status(raw.status.as_deref().unwrap_or_default()),
            kind,
            origin: raw.origin.clone().unwrap_or_default(),
            allows_overbook: raw.allows_overbook.unwrap_or(false),
            notes: raw.notes.as_ref().and_then(notes_to_string),
        }
    }
}

impl SlotGridConfig {
    /// Build a usable config from the wire shape; missing or invalid
    /// fields degrade to the default grid.
    pub fn from_raw(raw: &RawSlotConfig) -> SlotGridConfig {
        let defaults = SlotGridConfig::default();
        SlotGridConfig {
            start_of_day: raw
                .start_of_day
                .as_deref()
                .and_then(parse_time_of_day)
                .unwrap_or(defaults.start_of_day),
            end_of_day: raw
                .end_of_day
                .as_deref()
                .and_then(parse_time_of_day)
                .unwrap_or(defaults.end_of_day),
            step_minutes: raw.step_minutes.unwrap_or(defaults.step_minutes),
        }
        .sanitized()
    }
}

fn classify_kind(raw: Option<&str>) -> EntryKind {
    let folded = fold_accents(raw.unwrap_or_default());
    if folded.contains("bloqueio") || folded.contains("block") {
        EntryKind::Block
    } else {
        EntryKind::Appointment
    }
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Notes are opaque text; a legacy structured sub-object is carried
/// verbatim as its JSON text.
fn notes_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn midnight() -> NaiveTime {
    NaiveTime::from_num_seconds_from_midnight_opt(0, 0).unwrap_or_default()
}

/// Entries without any parseable date land on the epoch date, outside any
/// real view period.
fn epoch_date() -> NaiveDate {
    NaiveDate::default()
}
