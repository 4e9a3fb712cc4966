//! Status and origin taxonomy normalization.
//!
//! The backend, the legacy UI, and free-text imports all spell statuses
//! differently ("Concluído", "ATENDIDO", "em atendimento", ...). These
//! functions map any spelling onto the closed enums through an ordered
//! substring rule table. They are total: unmatched input lands on the
//! default arm instead of erroring, so a malformed payload can never take
//! the agenda down.

use crate::models::{AppointmentEntry, AppointmentStatus, DaySummary, EntryKind, EntryOrigin};

/// Ordered matching rules. Order matters where vocabularies overlap:
/// completed terms run before in-progress ones ("atendido" must not be
/// captured by the "atendimento" rule) and cancelled terms run before
/// scheduled ones ("desmarcado" must not be captured by "marcado").
const STATUS_RULES: &[(&[&str], AppointmentStatus)] = &[
    (
        &["atendid", "concluid", "finalizad", "completed", "done"],
        AppointmentStatus::Completed,
    ),
    (
        &["atendimento", "andamento", "in progress", "in_progress"],
        AppointmentStatus::InProgress,
    ),
    (&["confirmad", "confirmed"], AppointmentStatus::Confirmed),
    (
        &["faltou", "nao compareceu", "ausente", "no show", "no_show"],
        AppointmentStatus::NoShow,
    ),
    (
        &["cancelad", "desmarcad", "cancelled", "canceled"],
        AppointmentStatus::Cancelled,
    ),
    (
        &["agendad", "marcad", "scheduled", "pending"],
        AppointmentStatus::Scheduled,
    ),
];

const ORIGIN_RULES: &[(&[&str], EntryOrigin)] = &[
    (&["sistema", "system", "auto"], EntryOrigin::System),
    (&["medic", "clinic", "doutor", "doctor"], EntryOrigin::Clinician),
    (&["recep", "balcao", "front", "desk"], EntryOrigin::FrontDesk),
];

/// Lowercase and strip Latin-1 accents so "Concluído" and "CONCLUIDO"
/// match the same rule.
pub fn fold_accents(raw: &str) -> String {
    raw.chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            'ñ' => 'n',
            other => other,
        })
        .collect()
}

fn match_status_rule(folded: &str) -> Option<AppointmentStatus> {
    for (terms, status) in STATUS_RULES {
        if terms.iter().any(|term| folded.contains(term)) {
            return Some(*status);
        }
    }
    None
}

/// Map any status spelling onto the closed enum. Total; unmatched input
/// (including the empty string) is `Scheduled`.
pub fn normalize_status(raw: &str) -> AppointmentStatus {
    match_status_rule(&fold_accents(raw)).unwrap_or(AppointmentStatus::Scheduled)
}

/// Inverse mapping onto the backend's canonical vocabulary, with the same
/// rule order and the `Scheduled` code as default.
pub fn map_status_to_backend_code(raw: &str) -> &'static str {
    normalize_status(raw).backend_code()
}

/// Presentation classifier for a status spelling.
pub fn classify_display_style(raw: &str) -> &'static str {
    match normalize_status(raw) {
        AppointmentStatus::Scheduled => "default",
        AppointmentStatus::Confirmed => "info",
        AppointmentStatus::InProgress => "warning",
        AppointmentStatus::Completed => "success",
        AppointmentStatus::NoShow => "danger",
        AppointmentStatus::Cancelled => "muted",
    }
}

/// Map any origin spelling onto the provenance enum; defaults to the
/// front desk, which is where untagged entries historically came from.
pub fn normalize_origin(raw: &str) -> EntryOrigin {
    let folded = fold_accents(raw);
    for (terms, origin) in ORIGIN_RULES {
        if terms.iter().any(|term| folded.contains(term)) {
            return *origin;
        }
    }
    EntryOrigin::FrontDesk
}

pub fn map_origin_to_backend_code(raw: &str) -> &'static str {
    normalize_origin(raw).backend_code()
}

/// Does an entry with `status` pass the user's free-text status filter?
///
/// The filter is normalized through the same rule table first; when it
/// matches a rule the entry must carry exactly that status, otherwise it
/// degrades to a folded substring match on the entry's canonical label.
/// An empty filter passes everything.
pub fn status_filter_matches(status: AppointmentStatus, raw_filter: &str) -> bool {
    let folded = fold_accents(raw_filter.trim());
    if folded.is_empty() {
        return true;
    }
    if let Some(wanted) = match_status_rule(&folded) {
        return status == wanted;
    }
    status.label().contains(&folded)
}

/// Per-status counts over one day's entries. Blocks occupy the grid but
/// are not appointments, so they are excluded from every count.
pub fn compute_day_summary(entries: &[AppointmentEntry]) -> DaySummary {
    let mut summary = DaySummary::default();
    for entry in entries {
        if entry.kind == EntryKind::Block {
            continue;
        }
        match entry.status {
            AppointmentStatus::Scheduled => summary.scheduled += 1,
            AppointmentStatus::Confirmed => summary.confirmed += 1,
            AppointmentStatus::InProgress => summary.in_progress += 1,
            AppointmentStatus::Completed => summary.completed += 1,
            AppointmentStatus::NoShow => summary.no_show += 1,
            AppointmentStatus::Cancelled => summary.cancelled += 1,
        }
    }
    summary
}
