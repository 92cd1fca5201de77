//! Vault Configuration
//!
//! Paging bound, subscriber limit and plan logging. Loaded from JSON; every
//! key is optional and falls back to its default.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::criteria::MAX_PAGE_SIZE;
use crate::observability::{Event, Logger};
use crate::realtime::DEFAULT_MAX_SUBSCRIBERS;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Cannot read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Config is not valid JSON for `VaultConfig`
    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value is out of range
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Vault query engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultConfig {
    /// Largest page a query may request (default: 512)
    #[serde(default = "default_max_page_size")]
    pub max_page_size: i32,

    /// Concurrent live-feed subscribers allowed (default: 1024)
    #[serde(default = "default_max_subscribers")]
    pub max_subscribers: usize,

    /// Log every query plan at TRACE (default: false)
    #[serde(default)]
    pub explain_queries: bool,
}

fn default_max_page_size() -> i32 {
    MAX_PAGE_SIZE
}

fn default_max_subscribers() -> usize {
    DEFAULT_MAX_SUBSCRIBERS
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            max_page_size: default_max_page_size(),
            max_subscribers: default_max_subscribers(),
            explain_queries: false,
        }
    }
}

impl VaultConfig {
    /// Parses and validates a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: VaultConfig = serde_json::from_str(json)?;
        config.validate()?;
        Logger::event(
            Event::ConfigLoaded,
            &[
                ("explain_queries", config.explain_queries.to_string().as_str()),
                ("max_page_size", config.max_page_size.to_string().as_str()),
                ("max_subscribers", config.max_subscribers.to_string().as_str()),
            ],
        );
        Ok(config)
    }

    /// Reads, parses and validates a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn with_max_page_size(mut self, max_page_size: i32) -> Self {
        self.max_page_size = max_page_size;
        self
    }

    pub fn with_max_subscribers(mut self, max_subscribers: usize) -> Self {
        self.max_subscribers = max_subscribers;
        self
    }

    pub fn with_explain_queries(mut self, explain_queries: bool) -> Self {
        self.explain_queries = explain_queries;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_page_size < 1 || self.max_page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::InvalidValue {
                field: "max_page_size",
                reason: format!(
                    "must be in 1..={}, got {}",
                    MAX_PAGE_SIZE, self.max_page_size
                ),
            });
        }
        if self.max_subscribers == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_subscribers",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
