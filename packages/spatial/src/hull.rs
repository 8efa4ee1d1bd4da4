//! Convex hulls and centroids over member coordinates.
//!
//! Coordinates are treated as planar `(x = longitude, y = latitude)`
//! points. The hull itself is computed by [`geo::ConvexHull`].

use std::collections::BTreeSet;

use geo::{Area, Centroid, ConvexHull, MultiPoint, Point};
use zip_cluster_geography_models::Coordinate;

/// Outcome of a hull computation.
#[derive(Debug, Clone, PartialEq)]
pub enum Hull {
    /// Fewer than three distinct points.
    TooFewPoints,
    /// At least three distinct points, but all on one line.
    Collinear,
    /// Hull vertices in counter-clockwise order, without the closing vertex.
    Polygon(Vec<Coordinate>),
}

fn to_point(c: &Coordinate) -> Point<f64> {
    Point::new(c.longitude, c.latitude)
}

/// Number of distinct coordinates, comparing exact bit patterns.
#[must_use]
pub fn distinct_count(points: &[Coordinate]) -> usize {
    points
        .iter()
        // `+ 0.0` folds -0.0 into 0.0
        .map(|c| ((c.latitude + 0.0).to_bits(), (c.longitude + 0.0).to_bits()))
        .collect::<BTreeSet<_>>()
        .len()
}

/// Computes the convex hull of `points`.
#[must_use]
pub fn convex_hull(points: &[Coordinate]) -> Hull {
    if distinct_count(points) < 3 {
        return Hull::TooFewPoints;
    }

    let multi: MultiPoint<f64> = points.iter().map(to_point).collect();
    let polygon = multi.convex_hull();

    let mut vertices: Vec<Coordinate> = polygon
        .exterior()
        .coords()
        .map(|c| Coordinate {
            latitude: c.y,
            longitude: c.x,
        })
        .collect();

    // The exterior ring is closed; drop the repeated first vertex.
    if vertices.len() > 1 && vertices.first() == vertices.last() {
        vertices.pop();
    }

    if vertices.len() < 3 || polygon.unsigned_area() <= 0.0 {
        return Hull::Collinear;
    }

    Hull::Polygon(vertices)
}

/// Arithmetic mean of `points`, or `None` if empty.
#[must_use]
pub fn centroid(points: &[Coordinate]) -> Option<Coordinate> {
    let multi: MultiPoint<f64> = points.iter().map(to_point).collect();
    multi.centroid().map(|p| Coordinate {
        latitude: p.y(),
        longitude: p.x(),
    })
}
