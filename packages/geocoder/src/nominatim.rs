//! Nominatim / OpenStreetMap geocoder client.
//!
//! The public instance allows **1 request per second**; the batch driver's
//! courtesy delay keeps a run under that.
//!
//! See <https://nominatim.org/release-docs/develop/api/Search/>

use std::time::Duration;

use zip_cluster_geography_models::Coordinate;

use crate::config::{ConfigError, GeocodingService, ProviderConfig};
use crate::{GeocodeError, GeocodeQuery, GeocodedAddress, Geocoder};

/// HTTP client for a Nominatim search endpoint.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
}

impl NominatimGeocoder {
    #[must_use]
    pub const fn new(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    /// Builds a client from a service configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the service is disabled or the
    /// HTTP client cannot be built.
    pub fn from_service(service: &GeocodingService) -> Result<Self, ConfigError> {
        if !service.enabled {
            return Err(ConfigError::Invalid {
                name: service.id.clone(),
                message: "service is disabled in its configuration".to_string(),
            });
        }

        let ProviderConfig::Nominatim {
            base_url,
            user_agent,
            request_timeout_ms,
            ..
        } = &service.provider;

        let client = reqwest::Client::builder()
            .user_agent(user_agent.as_str())
            .timeout(Duration::from_millis(*request_timeout_ms))
            .build()
            .map_err(|e| ConfigError::Invalid {
                name: service.id.clone(),
                message: format!("Failed to build HTTP client: {e}"),
            })?;

        Ok(Self::new(client, base_url.clone()))
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Query-string parameters for a lookup.
fn query_params(query: &GeocodeQuery) -> Vec<(&'static str, &str)> {
    let mut params = match query {
        GeocodeQuery::FreeText(text) => vec![("q", text.as_str())],
        GeocodeQuery::Postal {
            postal_code,
            country,
        } => vec![
            ("postalcode", postal_code.as_str()),
            ("country", country.as_str()),
        ],
    };
    params.push(("format", "jsonv2"));
    params.push(("limit", "1"));
    params
}

#[async_trait::async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(
        &self,
        query: &GeocodeQuery,
    ) -> Result<Option<GeocodedAddress>, GeocodeError> {
        let resp = self
            .client
            .get(&self.base_url)
            .query(&query_params(query))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GeocodeError::Timeout
                } else {
                    GeocodeError::Http(e)
                }
            })?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(GeocodeError::RateLimited);
        }

        let body: serde_json::Value = resp.error_for_status()?.json().await?;
        parse_response(&body)
    }
}

/// Parses a Nominatim `jsonv2` response, keeping only the first result.
fn parse_response(body: &serde_json::Value) -> Result<Option<GeocodedAddress>, GeocodeError> {
    let results = body.as_array().ok_or_else(|| GeocodeError::Parse {
        message: "Nominatim response is not an array".to_string(),
    })?;

    let Some(first) = results.first() else {
        return Ok(None);
    };

    let lat = first["lat"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| GeocodeError::Parse {
            message: "Missing lat in Nominatim response".to_string(),
        })?;

    let lon = first["lon"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| GeocodeError::Parse {
            message: "Missing lon in Nominatim response".to_string(),
        })?;

    let coordinate = Coordinate::new(lat, lon).map_err(|e| GeocodeError::Parse {
        message: format!("Nominatim returned {e}"),
    })?;

    Ok(Some(GeocodedAddress {
        coordinate,
        matched_address: first["display_name"].as_str().map(String::from),
    }))
}
