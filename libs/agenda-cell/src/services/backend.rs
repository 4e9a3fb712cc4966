//! `AgendaApi` over the upstream action/envelope API.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{json, Value};
use tracing::{debug, warn};

use shared_api::ApiClient;
use shared_config::AppConfig;

use crate::models::{RawAgendaEntry, RawSlotConfig, SlotGridConfig};
use crate::services::reconciler::AgendaApi;

pub struct ApiAgendaBackend {
    client: ApiClient,
}

impl ApiAgendaBackend {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: ApiClient::new(config),
        }
    }
}

#[async_trait]
impl AgendaApi for ApiAgendaBackend {
    async fn fetch_agenda(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<RawAgendaEntry>> {
        debug!("Fetching agenda entries from {} to {}", start, end);

        let data = self
            .client
            .call(
                "agenda.list",
                json!({
                    "start": start.to_string(),
                    "end": end.to_string(),
                }),
            )
            .await?;

        let rows = match data {
            Value::Array(rows) => rows,
            Value::Null => Vec::new(),
            other => return Err(anyhow!("Unexpected agenda payload shape: {}", other)),
        };

        // Undecodable rows are skipped rather than failing the reload;
        // normalization downstream absorbs everything else.
        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            match serde_json::from_value::<RawAgendaEntry>(row) {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!("Skipping undecodable agenda row: {}", e),
            }
        }

        debug!("Fetched {} agenda entries", entries.len());
        Ok(entries)
    }

    async fn fetch_slot_config(&self) -> Result<SlotGridConfig> {
        debug!("Fetching slot grid configuration");

        let data = self.client.call("agenda.config", json!({})).await?;
        let raw: RawSlotConfig = serde_json::from_value(data)?;

        Ok(SlotGridConfig::from_raw(&raw))
    }

    async fn fetch_patients(&self) -> Result<Vec<Value>> {
        let data = self.client.call("patients.list", json!({})).await?;
        match data {
            Value::Array(rows) => Ok(rows),
            Value::Null => Ok(Vec::new()),
            other => Err(anyhow!("Unexpected patients payload shape: {}", other)),
        }
    }

    async fn fetch_records(&self) -> Result<Vec<Value>> {
        let data = self.client.call("records.list", json!({})).await?;
        match data {
            Value::Array(rows) => Ok(rows),
            Value::Null => Ok(Vec::new()),
            other => Err(anyhow!("Unexpected records payload shape: {}", other)),
        }
    }
}
