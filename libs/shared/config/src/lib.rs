use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base_url: String,
    pub api_key: String,
    pub clinic_id: String,
    pub offline_cache_path: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            api_base_url: env::var("CLINIC_API_BASE_URL")
                .unwrap_or_else(|_| {
                    warn!("CLINIC_API_BASE_URL not set, using empty value");
                    String::new()
                }),
            api_key: env::var("CLINIC_API_KEY")
                .unwrap_or_else(|_| {
                    warn!("CLINIC_API_KEY not set, using empty value");
                    String::new()
                }),
            clinic_id: env::var("CLINIC_ID")
                .unwrap_or_else(|_| {
                    warn!("CLINIC_ID not set, using empty value");
                    String::new()
                }),
            offline_cache_path: env::var("CLINIC_OFFLINE_CACHE_PATH")
                .unwrap_or_else(|_| {
                    warn!("CLINIC_OFFLINE_CACHE_PATH not set, using default");
                    "clinic_offline_cache.db".to_string()
                }),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.api_base_url.is_empty()
            && !self.api_key.is_empty()
            && !self.clinic_id.is_empty()
    }
}
