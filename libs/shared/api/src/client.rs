use anyhow::Result;
use reqwest::{
    Client,
    header::{HeaderMap, HeaderValue, CONTENT_TYPE},
};
use serde_json::{json, Value};
use tracing::{debug, error};

use shared_config::AppConfig;
use shared_models::{ApiEnvelope, SyncError};

/// Thin wrapper over the upstream data API.
///
/// Every call is a POST of `{ action, clinic_id, payload }` to the single
/// API endpoint; responses follow the `{ success, data, errors[] }`
/// envelope regardless of action.
pub struct ApiClient {
    client: Client,
    base_url: String,
    api_key: String,
    clinic_id: String,
}

impl ApiClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.api_base_url.clone(),
            api_key: config.api_key.clone(),
            clinic_id: config.clinic_id.clone(),
        }
    }

    fn get_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        if let Ok(value) = HeaderValue::from_str(&self.api_key) {
            headers.insert("apikey", value);
        }
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        headers
    }

    /// Issue an action call and unwrap the response envelope.
    pub async fn call(&self, action: &str, payload: Value) -> Result<Value> {
        let url = format!("{}/api", self.base_url);
        debug!("Calling action {} on {}", action, url);

        let body = json!({
            "action": action,
            "clinic_id": self.clinic_id,
            "payload": payload,
        });

        let response = self
            .client
            .post(&url)
            .headers(self.get_headers())
            .json(&body)
            .send()
            .await
            .map_err(|e| SyncError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("API error ({}): {}", status, error_text);

            return Err(match status.as_u16() {
                401 | 403 => SyncError::Api(format!("Authentication error: {}", error_text)),
                404 => SyncError::Api(format!("Resource not found: {}", error_text)),
                _ => SyncError::Transport(format!("API error ({}): {}", status, error_text)),
            }
            .into());
        }

        let envelope = response
            .json::<ApiEnvelope>()
            .await
            .map_err(|e| SyncError::Decode(e.to_string()))?;
        let data = envelope.into_data()?;
        Ok(data)
    }

    pub fn get_base_url(&self) -> &str {
        &self.base_url
    }
}
