//! Configuration models loaded from external sources.

use std::time::Duration;

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::pagination::DEFAULT_ITEMS_PER_PAGE;
use crate::sync::DEFAULT_DEBOUNCE_WINDOW;

#[derive(Clone, Debug, Deserialize)]
/// Settings of the books REST service.
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
    /// Origins allowed by CORS. An empty list allows any origin.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

#[derive(Clone, Debug, Deserialize)]
/// Settings of the catalog browser.
pub struct ClientConfig {
    /// Base URL of the books service, without a trailing slash.
    pub api_url: String,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_page_size() -> usize {
    DEFAULT_ITEMS_PER_PAGE
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_WINDOW.as_millis() as u64
}

fn default_request_timeout_secs() -> u64 {
    10
}

impl ClientConfig {
    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Loads `config/default.yaml`, the optional `config/{APP_ENV}.yaml` profile
/// (defaults to `local`) and `APP_*` environment variables, in that order.
pub fn load<T: DeserializeOwned>() -> Result<T, config::ConfigError> {
    let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "local".into());

    config::Config::builder()
        .add_source(config::File::with_name("config/default"))
        .add_source(config::File::with_name(&format!("config/{app_env}")).required(false))
        .add_source(config::Environment::with_prefix("APP"))
        .build()?
        .try_deserialize::<T>()
}
