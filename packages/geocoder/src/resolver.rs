//! The address resolution fallback chain.
//!
//! Strategies are tried in [`ResolutionStrategy::CHAIN`] order and the
//! first one to produce a coordinate wins. A strategy that cannot apply
//! (no ZIP hint, no reference set, nothing extracted) is skipped. When
//! every strategy fails the record is [`ResolutionResult::Unresolved`].

use zip_cluster_geography_models::{Coordinate, RawAddress, ResolutionResult, ResolutionStrategy};
use zip_cluster_spatial::{DEFAULT_MAX_DISTANCE_KM, ReferenceSet};

use crate::address::{extract_city_state, extract_street_city_state, extract_zip};
use crate::client::GeocodeClient;
use crate::overrides::OverrideTable;
use crate::{GeocodeQuery, Geocoder};

/// Resolves [`RawAddress`] records to coordinates.
pub struct AddressResolver<G> {
    client: GeocodeClient<G>,
    overrides: OverrideTable,
    reference: Option<ReferenceSet>,
    chain: Vec<ResolutionStrategy>,
    country: String,
    nearby_max_distance_km: f64,
}

impl<G: Geocoder> AddressResolver<G> {
    /// Creates a resolver running the full chain with no reference set.
    #[must_use]
    pub fn new(client: GeocodeClient<G>, overrides: OverrideTable) -> Self {
        Self {
            client,
            overrides,
            reference: None,
            chain: ResolutionStrategy::CHAIN.to_vec(),
            country: "USA".to_string(),
            nearby_max_distance_km: DEFAULT_MAX_DISTANCE_KM,
        }
    }

    /// Enables the nearby-ZIP fallback against `reference`.
    #[must_use]
    pub fn with_reference_set(mut self, reference: ReferenceSet) -> Self {
        self.reference = Some(reference);
        self
    }

    /// Replaces the strategy chain, e.g. to exercise one strategy alone.
    #[must_use]
    pub fn with_chain(mut self, chain: Vec<ResolutionStrategy>) -> Self {
        self.chain = chain;
        self
    }

    /// Country sent with postal-code queries.
    #[must_use]
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = country.into();
        self
    }

    /// Search radius for the nearby-ZIP fallback.
    #[must_use]
    pub const fn with_nearby_max_distance_km(mut self, km: f64) -> Self {
        self.nearby_max_distance_km = km;
        self
    }

    #[must_use]
    pub const fn client(&self) -> &GeocodeClient<G> {
        &self.client
    }

    #[must_use]
    pub fn chain(&self) -> &[ResolutionStrategy] {
        &self.chain
    }

    /// Runs the chain for one record.
    ///
    /// The ZIP hint is taken from the record, or extracted from its address
    /// text when absent.
    pub async fn resolve(&self, address: &RawAddress) -> ResolutionResult {
        let zip = address
            .zip
            .clone()
            .filter(|z| !z.trim().is_empty())
            .or_else(|| extract_zip(&address.address));

        for &strategy in &self.chain {
            if let Some(coordinate) = self.attempt(strategy, address, zip.as_deref()).await {
                log::info!("Resolved '{}' via {strategy}: {coordinate}", address.address);
                return ResolutionResult::Resolved {
                    coordinate,
                    strategy,
                };
            }
            log::debug!("{strategy} failed for '{}'", address.address);
        }

        ResolutionResult::Unresolved
    }

    /// Runs a single strategy.
    pub async fn attempt(
        &self,
        strategy: ResolutionStrategy,
        address: &RawAddress,
        zip: Option<&str>,
    ) -> Option<Coordinate> {
        match strategy {
            ResolutionStrategy::Override => self.override_for(&address.address),
            ResolutionStrategy::FullAddress => {
                let text = address.address.trim();
                if text.is_empty() {
                    return None;
                }
                self.client
                    .lookup(&GeocodeQuery::FreeText(text.to_string()))
                    .await
            }
            ResolutionStrategy::Zip => self.client.lookup(&self.postal_query(zip?)).await,
            ResolutionStrategy::NearbyZip => self.nearby_zip(zip?).await,
            ResolutionStrategy::StreetCityState => {
                let query = extract_street_city_state(&address.address)?;
                let found = self.client.lookup(&GeocodeQuery::FreeText(query.clone())).await;
                if found.is_some() {
                    log::info!("Using street/city/state coordinates for: {query}");
                }
                found
            }
            ResolutionStrategy::CityState => {
                let query = extract_city_state(&address.address)?;
                let found = self.client.lookup(&GeocodeQuery::FreeText(query.clone())).await;
                if found.is_some() {
                    log::info!("Using city/state coordinates for: {query}");
                }
                found
            }
        }
    }

    fn override_for(&self, address: &str) -> Option<Coordinate> {
        let (entry, coordinate) = self.overrides.find(address)?;
        log::info!("Using hardcoded coordinates for {}", entry.label);
        Some(coordinate)
    }

    fn postal_query(&self, zip: &str) -> GeocodeQuery {
        GeocodeQuery::Postal {
            postal_code: zip.to_string(),
            country: self.country.clone(),
        }
    }

    /// Nearby-ZIP fallback: the reference entry for `zip` if there is one,
    /// otherwise the reference point nearest to where `zip` geocodes.
    async fn nearby_zip(&self, zip: &str) -> Option<Coordinate> {
        let reference = self.reference.as_ref()?;

        if let Some(coordinate) = reference.exact(zip) {
            log::info!("Found ZIP {zip} in reference data");
            return Some(coordinate);
        }

        let target = self.client.lookup_once(&self.postal_query(zip)).await?;
        let nearest = reference.nearest_within(target, self.nearby_max_distance_km)?;
        log::info!(
            "Found nearby ZIP {} within {:.2} km",
            nearest.point.zip,
            nearest.distance_km
        );
        Some(nearest.coordinate)
    }
}
