#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Address resolution for zip-cluster.
//!
//! Turns free-text addresses into coordinates through an ordered fallback
//! chain (see [`resolver`]):
//!
//! 1. **Override table**: verified coordinates for addresses that are
//!    known to geocode badly.
//! 2. **Full address** lookup.
//! 3. **ZIP** lookup as a structured postal query.
//! 4. **Nearby known ZIP** from a reference dataset.
//! 5. **Street, city, state** extracted from the address text.
//! 6. **City, state** extracted from the address text.
//!
//! Lookups go through the [`Geocoder`] capability trait. The production
//! provider is [`nominatim::NominatimGeocoder`]; the retry policy lives in
//! [`client::GeocodeClient`], independent of the transport.

pub mod address;
pub mod batch;
pub mod client;
pub mod config;
pub mod nominatim;
pub mod overrides;
pub mod resolver;

#[cfg(test)]
pub(crate) mod testing;

use std::fmt;

use thiserror::Error;
use zip_cluster_geography_models::Coordinate;

pub use batch::{BatchOptions, BatchReport, RecordOutcome, resolve_batch};
pub use client::{GeocodeClient, RetryPolicy};
pub use resolver::AddressResolver;

/// A single lookup request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeocodeQuery {
    /// Free-form text such as `"Main St, Springfield, IL"`.
    FreeText(String),
    /// Structured postal-code search.
    Postal {
        /// Postal code (e.g. `"62704"`).
        postal_code: String,
        /// Country name or code (e.g. `"USA"`).
        country: String,
    },
}

impl fmt::Display for GeocodeQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FreeText(text) => f.write_str(text),
            Self::Postal {
                postal_code,
                country,
            } => write!(f, "postalcode={postal_code}, country={country}"),
        }
    }
}

/// The top-ranked match for a lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedAddress {
    /// Location of the match.
    pub coordinate: Coordinate,
    /// Canonical name returned by the provider.
    pub matched_address: Option<String>,
}

/// Errors from a single lookup attempt.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// The provider did not answer in time.
    #[error("lookup timed out")]
    Timeout,

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimited,
}

impl GeocodeError {
    /// Whether this failure is transient and worth retrying.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Timeout => true,
            Self::Http(e) => e.is_timeout(),
            Self::Parse { .. } | Self::RateLimited => false,
        }
    }
}

/// A provider that resolves one query to at most one coordinate.
#[async_trait::async_trait]
pub trait Geocoder: Send + Sync {
    /// Looks up `query`, returning the provider's top-ranked match.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the request or response parsing fails.
    async fn geocode(&self, query: &GeocodeQuery)
    -> Result<Option<GeocodedAddress>, GeocodeError>;
}
