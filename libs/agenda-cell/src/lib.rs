pub mod models;
pub mod services;

// Re-export all models and services for external use
pub use models::*;
pub use services::*;

// Specifically re-export the scheduling surface used by host shells
pub use models::{
    AgendaGrid, AppointmentEntry, AppointmentStatus, DaySummary, EntryKind, SlotGridConfig,
    ViewKey, ViewState, WeekPeriod,
};
pub use services::normalize::BLOCK_DISPLAY_NAME;
