//! `GeoJSON` rendering of cluster boundaries.
//!
//! Hull boundaries become `Polygon` features and collinear clusters become
//! `MultiPoint` features. Clusters with an empty boundary are left out;
//! they have nothing to draw.

use geo::{LineString, MultiPoint, Point, Polygon};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue};
use zip_cluster_geography_models::{Boundary, Cluster, Coordinate};

fn to_geometry(boundary: &Boundary) -> Option<Geometry> {
    let value = match boundary {
        Boundary::Empty => return None,
        Boundary::Hull(vertices) => {
            let ring: LineString<f64> = vertices
                .iter()
                .map(|c| (c.longitude, c.latitude))
                .collect::<Vec<_>>()
                .into();
            geojson::Value::from(&Polygon::new(ring, vec![]))
        }
        Boundary::Degenerate(points) => {
            let multi: MultiPoint<f64> = points
                .iter()
                .map(|c| Point::new(c.longitude, c.latitude))
                .collect();
            geojson::Value::from(&multi)
        }
    };
    Some(Geometry::new(value))
}

fn lon_lat(c: Coordinate) -> JsonValue {
    JsonValue::from(vec![c.longitude, c.latitude])
}

fn properties(cluster: &Cluster) -> JsonObject {
    let mut props = JsonObject::new();
    props.insert("analysis".into(), cluster.analysis.as_str().into());
    props.insert("clusterId".into(), cluster.id.as_str().into());
    props.insert("zipCount".into(), cluster.zip_count().into());
    props.insert("totalPopulation".into(), cluster.total_population.into());
    props.insert(
        "meanIncome".into(),
        cluster.mean_income.map_or(JsonValue::Null, JsonValue::from),
    );
    props.insert(
        "centroid".into(),
        cluster.centroid.map_or(JsonValue::Null, lon_lat),
    );
    props.insert(
        "zips".into(),
        cluster
            .members
            .iter()
            .map(|m| JsonValue::from(m.point.zip.as_str()))
            .collect(),
    );
    props
}

/// Builds one feature per cluster that has a boundary.
#[must_use]
pub fn to_feature_collection<'a>(clusters: impl IntoIterator<Item = &'a Cluster>) -> FeatureCollection {
    let features = clusters
        .into_iter()
        .filter_map(|cluster| {
            let geometry = to_geometry(&cluster.boundary)?;
            Some(Feature {
                bbox: None,
                geometry: Some(geometry),
                id: None,
                properties: Some(properties(cluster)),
                foreign_members: None,
            })
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}
