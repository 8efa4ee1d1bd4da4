//! Scripted in-memory geocoder for tests.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;

use zip_cluster_geography_models::Coordinate;

use crate::{GeocodeError, GeocodeQuery, GeocodedAddress, Geocoder};

type Response = Result<Option<GeocodedAddress>, GeocodeError>;

/// Answers each query from a per-query queue of scripted responses.
///
/// Queries with no (remaining) script return `Ok(None)`. Every call is
/// recorded.
#[derive(Default)]
pub struct ScriptedGeocoder {
    scripts: Mutex<BTreeMap<String, VecDeque<Response>>>,
    calls: Mutex<Vec<GeocodeQuery>>,
}

impl ScriptedGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(self, query: &GeocodeQuery, response: Response) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .entry(query.to_string())
            .or_default()
            .push_back(response);
        self
    }

    /// Queues a successful match.
    pub fn found(self, query: &GeocodeQuery, latitude: f64, longitude: f64) -> Self {
        let hit = GeocodedAddress {
            coordinate: Coordinate::new(latitude, longitude).unwrap(),
            matched_address: None,
        };
        self.push(query, Ok(Some(hit)))
    }

    /// Queues `n` timeouts.
    pub fn timeouts(mut self, query: &GeocodeQuery, n: usize) -> Self {
        for _ in 0..n {
            self = self.push(query, Err(GeocodeError::Timeout));
        }
        self
    }

    /// Queues a non-transient failure.
    pub fn fails(self, query: &GeocodeQuery) -> Self {
        self.push(
            query,
            Err(GeocodeError::Parse {
                message: "scripted failure".to_string(),
            }),
        )
    }

    pub fn calls(&self) -> Vec<GeocodeQuery> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, query: &GeocodeQuery) -> usize {
        self.calls.lock().unwrap().iter().filter(|q| *q == query).count()
    }
}

#[async_trait::async_trait]
impl Geocoder for ScriptedGeocoder {
    async fn geocode(&self, query: &GeocodeQuery) -> Response {
        self.calls.lock().unwrap().push(query.clone());
        self.scripts
            .lock()
            .unwrap()
            .get_mut(&query.to_string())
            .and_then(VecDeque::pop_front)
            .unwrap_or(Ok(None))
    }
}

pub fn text(query: &str) -> GeocodeQuery {
    GeocodeQuery::FreeText(query.to_string())
}

pub fn postal(zip: &str) -> GeocodeQuery {
    GeocodeQuery::Postal {
        postal_code: zip.to_string(),
        country: "USA".to_string(),
    }
}
