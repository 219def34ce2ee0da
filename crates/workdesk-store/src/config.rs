//! Store Configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::retry::RetryPolicy;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing backend configuration: {0}")]
    Missing(&'static str),
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

fn default_cache_ttl_secs() -> u64 {
    300
}

fn default_cleanup_interval_secs() -> u64 {
    300
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Backend base URL (the REST API lives under `/rest/v1`)
    #[serde(default)]
    pub api_url: String,
    /// Public (anon) API key sent with every request
    #[serde(default)]
    pub anon_key: String,
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    #[serde(default = "default_cleanup_interval_secs")]
    pub cleanup_interval_secs: u64,
    #[serde(default)]
    pub retry: RetryPolicy,
    /// Send one store's remote calls one at a time, in issue order
    #[serde(default = "default_true")]
    pub serialize_remote_calls: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            anon_key: String::new(),
            cache_ttl_secs: default_cache_ttl_secs(),
            cleanup_interval_secs: default_cleanup_interval_secs(),
            retry: RetryPolicy::default(),
            serialize_remote_calls: true,
        }
    }
}

impl StoreConfig {
    pub fn new(api_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            anon_key: anon_key.into(),
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Both the URL and the key are required to talk to the backend
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_url.trim().is_empty() {
            return Err(ConfigError::Missing("api_url"));
        }
        if self.anon_key.trim().is_empty() {
            return Err(ConfigError::Missing("anon_key"));
        }
        Ok(())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }
}
