#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geographic types shared across the zip-cluster toolchain.
//!
//! These types describe the inputs and outputs of address resolution
//! (raw addresses, coordinates, which strategy produced them) and of
//! cluster boundary construction (ZIP reference points grouped under an
//! analysis type).

use std::fmt;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use thiserror::Error;

/// Error returned when a latitude/longitude pair is outside the WGS84 domain.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CoordinateError {
    /// Latitude outside `[-90, 90]` or not finite.
    #[error("latitude {0} is outside [-90, 90]")]
    Latitude(f64),
    /// Longitude outside `[-180, 180]` or not finite.
    #[error("longitude {0} is outside [-180, 180]")]
    Longitude(f64),
}

/// A WGS84 latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinate {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl Coordinate {
    /// Creates a coordinate, validating both components.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinateError`] if either component is non-finite or
    /// outside its valid range.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinateError::Latitude(latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinateError::Longitude(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Whether both components are finite and inside the WGS84 domain.
    ///
    /// Coordinates deserialized from external data bypass [`Self::new`],
    /// so consumers check this before doing geometry.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        Self::new(self.latitude, self.longitude).is_ok()
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.latitude, self.longitude)
    }
}

/// A ZIP code with an established location, drawn from a prior dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnownPoint {
    /// Five-digit ZIP code.
    pub zip: String,
    /// Location of the ZIP, if the dataset has one.
    pub coordinate: Option<Coordinate>,
    /// Total population.
    pub population: Option<u64>,
    /// Median household income.
    pub median_income: Option<f64>,
}

impl KnownPoint {
    /// Returns the coordinate when present and inside the valid domain.
    #[must_use]
    pub fn valid_coordinate(&self) -> Option<Coordinate> {
        self.coordinate.filter(Coordinate::is_valid)
    }
}

/// A free-text address record awaiting resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAddress {
    /// The address as it appears in the source (e.g. "123 Main St, Springfield, IL 62704").
    pub address: String,
    /// ZIP code hint, if known.
    pub zip: Option<String>,
    /// Coordinates from a previous run, if any.
    pub previous: Option<Coordinate>,
}

impl RawAddress {
    /// Creates a record with only address text.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            zip: None,
            previous: None,
        }
    }

    /// Sets the ZIP hint.
    #[must_use]
    pub fn with_zip(mut self, zip: impl Into<String>) -> Self {
        self.zip = Some(zip.into());
        self
    }
}

/// One method in the address resolution fallback chain.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ResolutionStrategy {
    /// Verified coordinates from the hardcoded override table.
    Override,
    /// Lookup of the full address text.
    FullAddress,
    /// Structured postal-code lookup of the ZIP hint.
    Zip,
    /// Nearest known ZIP from the reference set.
    NearbyZip,
    /// Lookup of the extracted "street, city, state".
    StreetCityState,
    /// Lookup of the extracted "city, state".
    CityState,
}

impl ResolutionStrategy {
    /// The full fallback chain in the order strategies are tried.
    pub const CHAIN: &[Self] = &[
        Self::Override,
        Self::FullAddress,
        Self::Zip,
        Self::NearbyZip,
        Self::StreetCityState,
        Self::CityState,
    ];
}

/// Outcome of resolving one [`RawAddress`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ResolutionResult {
    /// A coordinate was found.
    Resolved {
        /// The resolved location.
        coordinate: Coordinate,
        /// Which strategy produced it.
        strategy: ResolutionStrategy,
    },
    /// Every strategy failed; coordinates stay unset.
    Unresolved,
}

impl ResolutionResult {
    /// Returns the coordinate if resolved.
    #[must_use]
    pub const fn coordinate(&self) -> Option<Coordinate> {
        match self {
            Self::Resolved { coordinate, .. } => Some(*coordinate),
            Self::Unresolved => None,
        }
    }

    /// Returns the strategy that produced the coordinate, if resolved.
    #[must_use]
    pub const fn strategy(&self) -> Option<ResolutionStrategy> {
        match self {
            Self::Resolved { strategy, .. } => Some(*strategy),
            Self::Unresolved => None,
        }
    }

    /// Whether a coordinate was found.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved { .. })
    }
}

/// A named clustering scheme, e.g. `"AB_10mi"` (grades A and B, 10 mile radius).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalysisType(pub String);

impl AnalysisType {
    /// Creates an analysis type from its name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The analysis name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AnalysisType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A ZIP reference point and its cluster assignment under one analysis type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterMember {
    /// The ZIP and its attributes.
    pub point: KnownPoint,
    /// Cluster identifier, or `None` if the ZIP is not clustered.
    pub cluster_id: Option<String>,
}

/// The polygon drawn around a cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "vertices", rename_all = "snake_case")]
pub enum Boundary {
    /// Fewer than three distinct member points; nothing to draw.
    Empty,
    /// Convex hull vertices, a subset of the member coordinates.
    Hull(Vec<Coordinate>),
    /// Members are collinear; every member coordinate is returned.
    Degenerate(Vec<Coordinate>),
}

impl Boundary {
    /// Boundary vertices in polygon order (empty for [`Self::Empty`]).
    #[must_use]
    pub fn vertices(&self) -> &[Coordinate] {
        match self {
            Self::Empty => &[],
            Self::Hull(v) | Self::Degenerate(v) => v,
        }
    }

    /// Whether there is nothing to draw.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// A group of geographically proximate ZIP codes under one analysis type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    /// Analysis type the cluster belongs to.
    pub analysis: AnalysisType,
    /// Cluster identifier within the analysis type.
    pub id: String,
    /// Members in input order.
    pub members: Vec<ClusterMember>,
    /// Outline for map rendering.
    pub boundary: Boundary,
    /// Sum of member populations (missing counts as nothing).
    pub total_population: u64,
    /// Mean over members that have an income.
    pub mean_income: Option<f64>,
    /// Arithmetic mean of member coordinates, for label placement.
    pub centroid: Option<Coordinate>,
}

impl Cluster {
    /// Number of ZIP codes in the cluster.
    #[must_use]
    pub fn zip_count(&self) -> usize {
        self.members.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_latitude() {
        assert_eq!(
            Coordinate::new(90.5, 0.0),
            Err(CoordinateError::Latitude(90.5))
        );
    }

    #[test]
    fn rejects_out_of_range_longitude() {
        assert_eq!(
            Coordinate::new(0.0, -180.5),
            Err(CoordinateError::Longitude(-180.5))
        );
    }

    #[test]
    fn rejects_nan() {
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn accepts_domain_edges() {
        assert!(Coordinate::new(-90.0, 180.0).is_ok());
        assert!(Coordinate::new(90.0, -180.0).is_ok());
    }

    #[test]
    fn strategy_chain_order() {
        assert_eq!(ResolutionStrategy::CHAIN.first(), Some(&ResolutionStrategy::Override));
        assert_eq!(ResolutionStrategy::CHAIN.last(), Some(&ResolutionStrategy::CityState));
        assert_eq!(ResolutionStrategy::CHAIN.len(), 6);
    }

    #[test]
    fn strategy_labels_are_snake_case() {
        assert_eq!(ResolutionStrategy::NearbyZip.as_ref(), "nearby_zip");
        assert_eq!(
            "street_city_state".parse::<ResolutionStrategy>().unwrap(),
            ResolutionStrategy::StreetCityState
        );
    }

    #[test]
    fn unresolved_has_no_coordinate() {
        let result = ResolutionResult::Unresolved;
        assert!(!result.is_resolved());
        assert!(result.coordinate().is_none());
        assert!(result.strategy().is_none());
    }

    #[test]
    fn known_point_filters_invalid_coordinate() {
        let point = KnownPoint {
            zip: "00000".to_string(),
            coordinate: Some(Coordinate {
                latitude: 120.0,
                longitude: 0.0,
            }),
            population: None,
            median_income: None,
        };
        assert!(point.valid_coordinate().is_none());
    }

    #[test]
    fn serializes_resolution_result() {
        let result = ResolutionResult::Resolved {
            coordinate: Coordinate::new(39.0485, -77.1277).unwrap(),
            strategy: ResolutionStrategy::Override,
        };
        let json = serde_json::to_value(result).unwrap();
        assert_eq!(json["status"], "resolved");
        assert_eq!(json["strategy"], "override");
        assert_eq!(json["coordinate"]["latitude"], 39.0485);
    }
}
