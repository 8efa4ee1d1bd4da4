#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Cluster boundaries for grouped ZIP codes.
//!
//! Each analysis type (see [`analysis`]) assigns ZIP codes to clusters.
//! [`builder`] turns those assignments into [`Cluster`] values with a
//! convex-hull boundary and population/income aggregates, recomputed
//! wholesale on every run. [`export`] renders them as `GeoJSON` for the
//! map layer.
//!
//! [`Cluster`]: zip_cluster_geography_models::Cluster

pub mod analysis;
pub mod builder;
pub mod export;

pub use analysis::{DEFAULT_ANALYSIS_TYPES, default_analysis_types, parse_cluster_label};
pub use builder::{build_all, build_clusters};
pub use export::to_feature_collection;
