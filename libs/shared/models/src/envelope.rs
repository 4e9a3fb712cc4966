use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SyncError;

/// Response envelope shared by every upstream API action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope {
    pub success: bool,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub errors: Vec<String>,
}

impl ApiEnvelope {
    /// Unwrap the envelope into its payload, mapping `success == false`
    /// onto an `Api` error carrying the joined error messages.
    pub fn into_data(self) -> Result<Value, SyncError> {
        if self.success {
            Ok(self.data.unwrap_or(Value::Null))
        } else {
            let message = if self.errors.is_empty() {
                "request rejected without error detail".to_string()
            } else {
                self.errors.join("; ")
            };
            Err(SyncError::Api(message))
        }
    }
}
