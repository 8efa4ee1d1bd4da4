#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Spatial primitives for ZIP resolution and cluster boundaries.
//!
//! - [`distance`]: haversine great-circle distance in kilometers.
//! - [`nearest`]: the ZIP reference set and nearest-known-point search
//!   used by the nearby-ZIP fallback.
//! - [`hull`]: convex hull and centroid over member coordinates, built on
//!   the `geo` crate.

pub mod distance;
pub mod hull;
pub mod nearest;

pub use distance::haversine_km;
pub use nearest::{DEFAULT_MAX_DISTANCE_KM, ReferenceSet, find_nearest};
