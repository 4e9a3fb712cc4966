//! Per-view agenda reconciliation.
//!
//! The reconciler is the only component with side effects beyond storage:
//! it bumps the sequencing guard, issues the fetch, normalizes and filters
//! the response, builds the grid, and opportunistically refreshes the
//! offline cache when the host is online. Each view (Day, Week) runs its
//! own independent state machine.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;
use tracing::{debug, warn};

use offline_cache_cell::{CacheTable, OfflineCache};
use preference_cell::{PreferenceStore, ViewPreference};
use shared_api::ConnectivitySignal;

use crate::models::{
    AgendaGrid, AppointmentEntry, DaySummary, RawAgendaEntry, SlotGridConfig, ViewKey, ViewState,
};
use crate::services::sequence::RequestSequencer;
use crate::services::slots::{compute_week_period, generate_slots, normalize_slot_time};
use crate::services::taxonomy::{compute_day_summary, fold_accents, status_filter_matches};

/// Transport seam to the upstream data API.
#[async_trait]
pub trait AgendaApi: Send + Sync {
    async fn fetch_agenda(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<RawAgendaEntry>>;
    async fn fetch_slot_config(&self) -> Result<SlotGridConfig>;
    async fn fetch_patients(&self) -> Result<Vec<Value>>;
    async fn fetch_records(&self) -> Result<Vec<Value>>;
}

#[derive(Default)]
struct SlotConfigState {
    loaded: bool,
    config: SlotGridConfig,
}

pub struct AgendaReconciler {
    api: Arc<dyn AgendaApi>,
    preferences: Arc<PreferenceStore>,
    cache: Arc<OfflineCache>,
    connectivity: Arc<dyn ConnectivitySignal>,
    sequencer: RequestSequencer,
    states: Mutex<HashMap<ViewKey, ViewState>>,
    slot_config: Mutex<SlotConfigState>,
}

impl AgendaReconciler {
    pub fn new(
        api: Arc<dyn AgendaApi>,
        preferences: Arc<PreferenceStore>,
        cache: Arc<OfflineCache>,
        connectivity: Arc<dyn ConnectivitySignal>,
    ) -> Self {
        Self {
            api,
            preferences,
            cache,
            connectivity,
            sequencer: RequestSequencer::new(),
            states: Mutex::new(HashMap::new()),
            slot_config: Mutex::new(SlotConfigState::default()),
        }
    }

    /// Reload the Day view for `date`.
    pub async fn load_day(&self, date: NaiveDate) -> ViewState {
        self.load_view(ViewKey::Day, date, date).await
    }

    /// Reload the Week view for the Monday-to-Sunday week containing
    /// `reference`.
    pub async fn load_week(&self, reference: NaiveDate) -> ViewState {
        let period = compute_week_period(reference);
        self.load_view(ViewKey::Week, period.start, period.end).await
    }

    /// The current state of a view.
    pub fn view_state(&self, view: ViewKey) -> ViewState {
        self.states
            .lock()
            .unwrap()
            .get(&view)
            .cloned()
            .unwrap_or_default()
    }

    /// Status counts for `date` over the view's rendered grid; empty when
    /// the view has nothing rendered.
    pub fn day_summary(&self, view: ViewKey, date: NaiveDate) -> DaySummary {
        match self.view_state(view) {
            ViewState::Rendered(grid) => {
                let entries: Vec<AppointmentEntry> = grid
                    .all_entries()
                    .filter(|entry| entry.date == date)
                    .cloned()
                    .collect();
                compute_day_summary(&entries)
            }
            _ => DaySummary::default(),
        }
    }

    /// The last agenda snapshot written while online, for rendering during
    /// connectivity loss. `None` when the snapshot is missing or expired.
    pub fn offline_agenda(&self) -> Option<Vec<AppointmentEntry>> {
        let items = match self.cache.get_cached_data(CacheTable::Agenda) {
            Ok(items) => items?,
            Err(e) => {
                warn!("Offline agenda read failed: {}", e);
                return None;
            }
        };
        Some(
            items
                .into_iter()
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
        )
    }

    /// Opportunistic refresh of the patient and record tables; a no-op
    /// while offline, best-effort while online.
    pub async fn sync_offline_tables(&self) {
        if !self.connectivity.is_online() {
            debug!("Offline, skipping reference data sync");
            return;
        }

        match self.api.fetch_patients().await {
            Ok(items) => {
                if let Err(e) = self.cache.cache_data(CacheTable::Patients, &items) {
                    warn!("Patient cache write failed: {}", e);
                }
            }
            Err(e) => warn!("Patient sync fetch failed: {}", e),
        }

        match self.api.fetch_records().await {
            Ok(items) => {
                if let Err(e) = self.cache.cache_data(CacheTable::Records, &items) {
                    warn!("Record cache write failed: {}", e);
                }
            }
            Err(e) => warn!("Record sync fetch failed: {}", e),
        }
    }

    async fn load_view(&self, view: ViewKey, start: NaiveDate, end: NaiveDate) -> ViewState {
        let token = self.sequencer.bump(view);
        self.set_state(view, ViewState::Loading);
        debug!(
            "Loading {} view {}..{} (generation {})",
            view.as_str(),
            start,
            end,
            token
        );

        let config = self.ensure_slot_config().await;
        let result = self.api.fetch_agenda(start, end).await;

        // A newer reload owns this view now; the late response must not
        // touch it, success or failure.
        if !self.sequencer.is_current(view, token) {
            debug!(
                "Discarding stale {} response (generation {})",
                view.as_str(),
                token
            );
            return self.view_state(view);
        }

        match result {
            Ok(raw_entries) => {
                let entries: Vec<AppointmentEntry> =
                    raw_entries.iter().map(AppointmentEntry::from_raw).collect();

                if self.connectivity.is_online() {
                    self.write_agenda_cache(&entries);
                }

                let preference = self.preferences.load();
                let visible: Vec<AppointmentEntry> = entries
                    .into_iter()
                    .filter(|entry| entry_matches_filters(entry, &preference))
                    .collect();

                let grid = build_grid(start, end, &config, visible);
                let state = ViewState::Rendered(grid);
                self.set_state(view, state.clone());
                state
            }
            Err(e) => {
                warn!("{} view reload failed: {}", view.as_str(), e);
                let state = ViewState::Error(e.to_string());
                self.set_state(view, state.clone());
                state
            }
        }
    }

    /// Clinic slot configuration, fetched at most once per session. A
    /// failed fetch degrades to the default grid for the rest of the
    /// session.
    async fn ensure_slot_config(&self) -> SlotGridConfig {
        {
            let state = self.slot_config.lock().unwrap();
            if state.loaded {
                return state.config.clone();
            }
        }

        let fetched = self.api.fetch_slot_config().await;

        let mut state = self.slot_config.lock().unwrap();
        if state.loaded {
            // Another view finished the fetch while this one was waiting.
            return state.config.clone();
        }
        state.loaded = true;
        state.config = match fetched {
            Ok(config) => config.sanitized(),
            Err(e) => {
                warn!("Slot config fetch failed, using default grid: {}", e);
                SlotGridConfig::default()
            }
        };
        state.config.clone()
    }

    fn write_agenda_cache(&self, entries: &[AppointmentEntry]) {
        let items: Vec<Value> = entries
            .iter()
            .filter_map(|entry| serde_json::to_value(entry).ok())
            .collect();
        if let Err(e) = self.cache.cache_data(CacheTable::Agenda, &items) {
            warn!("Agenda cache write failed: {}", e);
        }
    }

    fn set_state(&self, view: ViewKey, state: ViewState) {
        self.states.lock().unwrap().insert(view, state);
    }
}

fn entry_matches_filters(entry: &AppointmentEntry, preference: &ViewPreference) -> bool {
    let name_filter = fold_accents(preference.filters.name.trim());
    if !name_filter.is_empty() && !fold_accents(&entry.display_name).contains(&name_filter) {
        return false;
    }
    status_filter_matches(entry.status, &preference.filters.status)
}

fn build_grid(
    start: NaiveDate,
    end: NaiveDate,
    config: &SlotGridConfig,
    entries: Vec<AppointmentEntry>,
) -> AgendaGrid {
    let mut grid = AgendaGrid {
        period_start: start,
        period_end: end,
        slots: generate_slots(config),
        buckets: Default::default(),
    };

    for entry in entries {
        let label = normalize_slot_time(&entry.start_time.to_string());
        grid.buckets
            .entry((entry.date, label))
            .or_default()
            .push(entry);
    }

    grid
}
