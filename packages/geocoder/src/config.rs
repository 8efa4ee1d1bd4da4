//! Geocoding service configuration.
//!
//! The default configuration is embedded at compile time from
//! `services/nominatim.toml`. It carries the provider endpoint, the retry
//! policy of [`GeocodeClient`](crate::GeocodeClient), and the courtesy
//! delay the batch driver waits between records.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::batch::BatchOptions;
use crate::client::RetryPolicy;

/// Errors loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// TOML could not be parsed into the expected shape.
    #[error("Failed to parse {name}: {source}")]
    Toml {
        /// Which file or embedded config failed.
        name: String,
        /// Underlying parse error.
        #[source]
        source: toml::de::Error,
    },

    /// A config file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// Path that failed.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A value in an otherwise well-formed file is unusable.
    #[error("Invalid {name}: {message}")]
    Invalid {
        /// Which file or entry.
        name: String,
        /// What is wrong with it.
        message: String,
    },
}

/// A geocoding service configuration loaded from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodingService {
    /// Unique identifier (e.g., `"nominatim"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Whether lookups are sent to this service at all. A disabled service
    /// cannot be turned into a client.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Provider-specific configuration.
    pub provider: ProviderConfig,
    /// Per-lookup retry policy.
    #[serde(default)]
    pub retry: RetryConfig,
    /// Batch scheduling.
    #[serde(default)]
    pub batch: BatchConfig,
}

/// Provider-specific configuration, tagged by `type` in TOML.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Nominatim / `OpenStreetMap` search API.
    Nominatim {
        /// Search endpoint (e.g., `"https://nominatim.openstreetmap.org/search"`).
        base_url: String,
        /// `User-Agent` header; the public instance rejects anonymous clients.
        user_agent: String,
        /// Country sent with structured postal-code queries.
        #[serde(default = "default_country")]
        country: String,
        /// Per-request timeout in milliseconds.
        #[serde(default = "default_request_timeout_ms")]
        request_timeout_ms: u64,
    },
}

/// Retry settings for timeouts.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RetryConfig {
    /// Total attempts per lookup.
    pub max_attempts: u32,
    /// Delay between attempts in milliseconds.
    pub delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay_ms: 2000,
        }
    }
}

/// Batch driver scheduling.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct BatchConfig {
    /// Delay after each processed record, in milliseconds.
    pub courtesy_delay_ms: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            courtesy_delay_ms: 1000,
        }
    }
}

const fn default_true() -> bool {
    true
}

fn default_country() -> String {
    "USA".to_string()
}

const fn default_request_timeout_ms() -> u64 {
    10_000
}

const NOMINATIM_TOML: &str = include_str!("../services/nominatim.toml");

impl GeocodingService {
    /// Parses a service configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Toml`] if the text is malformed.
    pub fn from_toml_str(name: &str, text: &str) -> Result<Self, ConfigError> {
        toml::de::from_str(text).map_err(|source| ConfigError::Toml {
            name: name.to_string(),
            source,
        })
    }

    /// The embedded Nominatim configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Toml`] if the embedded file is malformed.
    pub fn embedded() -> Result<Self, ConfigError> {
        Self::from_toml_str("services/nominatim.toml", NOMINATIM_TOML)
    }

    /// Returns the provider's base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        match &self.provider {
            ProviderConfig::Nominatim { base_url, .. } => base_url,
        }
    }

    /// Country used for structured postal-code queries.
    #[must_use]
    pub fn country(&self) -> &str {
        match &self.provider {
            ProviderConfig::Nominatim { country, .. } => country,
        }
    }

    #[must_use]
    pub const fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retry.max_attempts,
            delay: Duration::from_millis(self.retry.delay_ms),
        }
    }

    #[must_use]
    pub const fn batch_options(&self) -> BatchOptions {
        BatchOptions {
            courtesy_delay: Duration::from_millis(self.batch.courtesy_delay_ms),
            reresolve_existing: true,
        }
    }
}
