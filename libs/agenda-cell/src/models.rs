// libs/agenda-cell/src/models.rs
use std::collections::BTreeMap;
use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ==============================================================================
// CORE AGENDA MODELS
// ==============================================================================

/// One calendar occupant after normalization: a real appointment or a
/// manual time block. Built from `RawAgendaEntry` on every reload and
/// never mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentEntry {
    pub id: String,
    pub patient_ref: Option<String>,
    pub display_name: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub duration_minutes: i64,
    pub status: AppointmentStatus,
    pub kind: EntryKind,
    pub origin: String,
    pub allows_overbook: bool,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    InProgress,
    Completed,
    NoShow,
    Cancelled,
}

impl AppointmentStatus {
    /// Canonical lowercase label, stable under re-normalization.
    pub fn label(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "agendado",
            AppointmentStatus::Confirmed => "confirmado",
            AppointmentStatus::InProgress => "em_atendimento",
            AppointmentStatus::Completed => "atendido",
            AppointmentStatus::NoShow => "faltou",
            AppointmentStatus::Cancelled => "cancelado",
        }
    }

    /// The backend's fixed vocabulary for this status.
    pub fn backend_code(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "AGENDADO",
            AppointmentStatus::Confirmed => "CONFIRMADO",
            AppointmentStatus::InProgress => "EM_ATENDIMENTO",
            AppointmentStatus::Completed => "ATENDIDO",
            AppointmentStatus::NoShow => "FALTOU",
            AppointmentStatus::Cancelled => "CANCELADO",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Appointment,
    Block,
}

/// Provenance of an entry, normalized from the free-text origin tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryOrigin {
    FrontDesk,
    Clinician,
    System,
}

impl EntryOrigin {
    pub fn backend_code(&self) -> &'static str {
        match self {
            EntryOrigin::FrontDesk => "RECEPCAO",
            EntryOrigin::Clinician => "MEDICO",
            EntryOrigin::System => "SISTEMA",
        }
    }
}

// ==============================================================================
// RAW PAYLOAD MODELS
// ==============================================================================

/// Wire shape of one agenda entry, accepting both the canonical backend
/// fields and the legacy Portuguese ones. Every field is optional;
/// `AppointmentEntry::from_raw` turns any instance into a valid entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawAgendaEntry {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default, alias = "paciente_id")]
    pub patient_id: Option<Value>,
    #[serde(default, alias = "paciente_nome", alias = "nome_paciente")]
    pub patient_name: Option<String>,
    #[serde(default, alias = "data")]
    pub date: Option<String>,
    #[serde(default, alias = "inicio")]
    pub start_time: Option<String>,
    #[serde(default, alias = "fim")]
    pub end_time: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, alias = "tipo")]
    pub kind: Option<String>,
    #[serde(default, alias = "origem")]
    pub origin: Option<String>,
    #[serde(default, alias = "permite_encaixe")]
    pub allows_overbook: Option<bool>,
    #[serde(default, alias = "observacoes")]
    pub notes: Option<Value>,
}

/// Wire shape of the clinic's slot grid configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawSlotConfig {
    #[serde(default, alias = "hora_inicio")]
    pub start_of_day: Option<String>,
    #[serde(default, alias = "hora_fim")]
    pub end_of_day: Option<String>,
    #[serde(default, alias = "intervalo_minutos")]
    pub step_minutes: Option<i64>,
}

// ==============================================================================
// SLOT GRID CONFIGURATION
// ==============================================================================

/// Clinic scheduling parameters. A misconfigured value (non-positive step,
/// inverted bounds) degrades to the default 15-minute 08:00-18:00 grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotGridConfig {
    pub start_of_day: NaiveTime,
    pub end_of_day: NaiveTime,
    pub step_minutes: i64,
}

impl Default for SlotGridConfig {
    fn default() -> Self {
        Self {
            start_of_day: NaiveTime::from_hms_opt(8, 0, 0).unwrap_or_default(),
            end_of_day: NaiveTime::from_hms_opt(18, 0, 0).unwrap_or_default(),
            step_minutes: 15,
        }
    }
}

impl SlotGridConfig {
    pub fn is_valid(&self) -> bool {
        self.step_minutes > 0 && self.start_of_day < self.end_of_day
    }

    pub fn sanitized(&self) -> SlotGridConfig {
        if self.is_valid() {
            self.clone()
        } else {
            SlotGridConfig::default()
        }
    }
}

// ==============================================================================
// VIEW MODELS
// ==============================================================================

/// Monday-to-Sunday week containing a reference date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days: [NaiveDate; 7],
}

/// Per-status counts for one day. Block entries are excluded from every
/// count, including the total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySummary {
    pub scheduled: usize,
    pub confirmed: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub no_show: usize,
    pub cancelled: usize,
}

impl DaySummary {
    pub fn total(&self) -> usize {
        self.scheduled + self.confirmed + self.in_progress + self.completed + self.no_show
            + self.cancelled
    }
}

/// Render product of a reload: the ordered slot labels plus entries
/// bucketed by `(date, slot label)`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AgendaGrid {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub slots: Vec<NaiveTime>,
    pub buckets: BTreeMap<(NaiveDate, String), Vec<AppointmentEntry>>,
}

impl AgendaGrid {
    pub fn entries_at(&self, date: NaiveDate, slot_label: &str) -> &[AppointmentEntry] {
        self.buckets
            .get(&(date, slot_label.to_string()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn all_entries(&self) -> impl Iterator<Item = &AppointmentEntry> {
        self.buckets.values().flatten()
    }

    pub fn entry_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }
}

/// Logical views tracked independently by the reconciler and the
/// sequencing guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKey {
    Day,
    Week,
}

impl ViewKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewKey::Day => "day",
            ViewKey::Week => "week",
        }
    }
}

/// State machine of one view.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ViewState {
    #[default]
    Idle,
    Loading,
    Rendered(AgendaGrid),
    Error(String),
}
