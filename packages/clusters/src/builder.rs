//! Builds [`Cluster`] values from cluster assignments.

use std::collections::BTreeMap;

use zip_cluster_geography_models::{AnalysisType, Boundary, Cluster, ClusterMember, Coordinate};
use zip_cluster_spatial::hull::{self, Hull};

/// Groups `members` by cluster id and builds every cluster of one
/// analysis type.
///
/// Members without a cluster id are skipped. A cluster with fewer than
/// three distinct valid coordinates gets [`Boundary::Empty`]; one whose
/// points are collinear gets [`Boundary::Degenerate`] with every valid
/// member coordinate. Neither case affects other clusters.
#[must_use]
pub fn build_clusters(
    analysis: &AnalysisType,
    members: &[ClusterMember],
) -> BTreeMap<String, Cluster> {
    let mut groups: BTreeMap<String, Vec<ClusterMember>> = BTreeMap::new();
    let mut skipped = 0usize;

    for member in members {
        match member.cluster_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => {
                groups.entry(id.to_string()).or_default().push(member.clone());
            }
            _ => skipped += 1,
        }
    }

    if skipped > 0 {
        log::info!("Skipping {skipped} ZIPs with a null cluster ID in {analysis}");
    }

    log::info!(
        "Found {} ZIPs in {} {analysis} clusters",
        members.len() - skipped,
        groups.len()
    );

    groups
        .into_iter()
        .map(|(id, members)| {
            let cluster = build_cluster(analysis, id.clone(), members);
            (id, cluster)
        })
        .collect()
}

/// Builds every analysis type in `assignments`.
#[must_use]
pub fn build_all(
    assignments: &BTreeMap<AnalysisType, Vec<ClusterMember>>,
) -> BTreeMap<AnalysisType, BTreeMap<String, Cluster>> {
    assignments
        .iter()
        .map(|(analysis, members)| (analysis.clone(), build_clusters(analysis, members)))
        .collect()
}

fn build_cluster(analysis: &AnalysisType, id: String, members: Vec<ClusterMember>) -> Cluster {
    let coordinates: Vec<Coordinate> = members
        .iter()
        .filter_map(|m| m.point.valid_coordinate())
        .collect();

    let boundary = match hull::convex_hull(&coordinates) {
        Hull::TooFewPoints => Boundary::Empty,
        Hull::Collinear => {
            log::debug!("Cluster {id} in {analysis} is collinear; using all member points");
            Boundary::Degenerate(coordinates.clone())
        }
        Hull::Polygon(vertices) => Boundary::Hull(vertices),
    };

    let total_population = members
        .iter()
        .filter_map(|m| m.point.population)
        .fold(0u64, u64::saturating_add);
    let mean_income = mean(members.iter().filter_map(|m| m.point.median_income));
    let centroid = hull::centroid(&coordinates);

    log::debug!(
        "Cluster {id} in {analysis}: {} ZIPs, {} coordinates, {} boundary points",
        members.len(),
        coordinates.len(),
        boundary.vertices().len()
    );

    Cluster {
        analysis: analysis.clone(),
        id,
        members,
        boundary,
        total_population,
        mean_income,
        centroid,
    }
}

/// Arithmetic mean of the finite values, or `None` if there are none.
#[allow(clippy::cast_precision_loss)]
fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use zip_cluster_geography_models::KnownPoint;

    use super::*;

    fn analysis() -> AnalysisType {
        AnalysisType::new("A_5mi")
    }

    fn member(zip: &str, cluster: Option<&str>, latitude: f64, longitude: f64) -> ClusterMember {
        ClusterMember {
            point: KnownPoint {
                zip: zip.to_string(),
                coordinate: Some(Coordinate::new(latitude, longitude).unwrap()),
                population: None,
                median_income: None,
            },
            cluster_id: cluster.map(String::from),
        }
    }

    fn with_stats(mut m: ClusterMember, population: Option<u64>, income: Option<f64>) -> ClusterMember {
        m.point.population = population;
        m.point.median_income = income;
        m
    }

    fn vertex_set(boundary: &Boundary) -> BTreeSet<(u64, u64)> {
        boundary
            .vertices()
            .iter()
            .map(|v| (v.latitude.to_bits(), v.longitude.to_bits()))
            .collect()
    }

    #[test]
    fn two_point_cluster_has_no_boundary() {
        let members = vec![
            member("60601", Some("1"), 41.88, -87.62),
            member("60602", Some("1"), 41.88, -87.63),
        ];
        let clusters = build_clusters(&analysis(), &members);

        let cluster = &clusters["1"];
        assert_eq!(cluster.boundary, Boundary::Empty);
        assert_eq!(cluster.zip_count(), 2);
        let zips: Vec<&str> = cluster.members.iter().map(|m| m.point.zip.as_str()).collect();
        assert_eq!(zips, vec!["60601", "60602"]);
    }

    #[test]
    fn square_with_center_hull_excludes_center() {
        let members = vec![
            member("10001", Some("1"), 40.0, -75.0),
            member("10002", Some("1"), 40.0, -74.0),
            member("10003", Some("1"), 40.5, -74.5),
            member("10004", Some("1"), 41.0, -74.0),
            member("10005", Some("1"), 41.0, -75.0),
        ];
        let clusters = build_clusters(&analysis(), &members);
        let cluster = &clusters["1"];

        assert!(matches!(cluster.boundary, Boundary::Hull(_)));
        let expected: BTreeSet<(u64, u64)> = [(40.0, -75.0), (40.0, -74.0), (41.0, -74.0), (41.0, -75.0)]
            .iter()
            .map(|&(lat, lon)| (f64::to_bits(lat), f64::to_bits(lon)))
            .collect();
        assert_eq!(vertex_set(&cluster.boundary), expected);
        assert_eq!(cluster.zip_count(), 5);

        let centroid = cluster.centroid.unwrap();
        assert!((centroid.latitude - 40.5).abs() < 1e-9);
        assert!((centroid.longitude - -74.5).abs() < 1e-9);
    }

    #[test]
    fn aggregates_population_and_income() {
        let members = vec![
            with_stats(member("1", Some("7"), 0.0, 0.0), Some(100), Some(1000.0)),
            with_stats(member("2", Some("7"), 0.0, 1.0), Some(200), None),
            with_stats(member("3", Some("7"), 1.0, 0.0), Some(300), Some(3000.0)),
        ];
        let cluster = &build_clusters(&analysis(), &members)["7"];

        assert_eq!(cluster.total_population, 600);
        let income = cluster.mean_income.unwrap();
        assert!((income - 2000.0).abs() < 1e-9);
    }

    #[test]
    fn missing_population_is_not_counted() {
        let members = vec![
            with_stats(member("1", Some("1"), 0.0, 0.0), Some(100), None),
            with_stats(member("2", Some("1"), 0.0, 1.0), None, None),
        ];
        let cluster = &build_clusters(&analysis(), &members)["1"];
        assert_eq!(cluster.total_population, 100);
        assert!(cluster.mean_income.is_none());
    }

    #[test]
    fn oversized_population_saturates() {
        let members = vec![
            with_stats(member("1", Some("1"), 0.0, 0.0), Some(u64::MAX), None),
            with_stats(member("2", Some("1"), 0.0, 1.0), Some(1), None),
            with_stats(member("3", Some("1"), 1.0, 0.0), Some(5), None),
        ];
        let cluster = &build_clusters(&analysis(), &members)["1"];
        assert_eq!(cluster.total_population, u64::MAX);
        assert!(matches!(cluster.boundary, Boundary::Hull(_)));
    }

    #[test]
    fn null_cluster_ids_are_skipped() {
        let members = vec![
            member("1", None, 0.0, 0.0),
            member("2", Some(""), 0.0, 1.0),
            member("3", Some("2"), 1.0, 0.0),
        ];
        let clusters = build_clusters(&analysis(), &members);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters["2"].zip_count(), 1);
    }

    #[test]
    fn collinear_cluster_returns_all_points() {
        let members = vec![
            member("1", Some("1"), 0.0, 0.0),
            member("2", Some("1"), 1.0, 1.0),
            member("3", Some("1"), 2.0, 2.0),
        ];
        let clusters = build_clusters(&analysis(), &members);
        let Boundary::Degenerate(points) = &clusters["1"].boundary else {
            panic!("expected degenerate boundary");
        };
        assert_eq!(points.len(), 3);
    }

    #[test]
    fn invalid_coordinates_excluded_from_hull() {
        let mut bad = member("4", Some("1"), 0.0, 0.0);
        bad.point.coordinate = Some(Coordinate {
            latitude: 200.0,
            longitude: 0.0,
        });
        let mut missing = member("5", Some("1"), 0.0, 0.0);
        missing.point.coordinate = None;
        let members = vec![
            member("1", Some("1"), 0.0, 0.0),
            member("2", Some("1"), 0.0, 1.0),
            bad,
            missing,
        ];
        let cluster = &build_clusters(&analysis(), &members)["1"];

        // Only two valid points remain.
        assert_eq!(cluster.boundary, Boundary::Empty);
        assert_eq!(cluster.zip_count(), 4);
    }

    #[test]
    fn degenerate_cluster_does_not_affect_others() {
        let members = vec![
            member("1", Some("1"), 0.0, 0.0),
            member("2", Some("2"), 0.0, 0.0),
            member("3", Some("2"), 0.0, 1.0),
            member("4", Some("2"), 1.0, 0.5),
        ];
        let clusters = build_clusters(&analysis(), &members);
        assert_eq!(clusters["1"].boundary, Boundary::Empty);
        assert!(matches!(clusters["2"].boundary, Boundary::Hull(_)));
    }

    #[test]
    fn rebuilding_yields_same_hulls() {
        let members = vec![
            member("1", Some("1"), 41.88, -87.63),
            member("2", Some("1"), 41.90, -87.70),
            member("3", Some("1"), 41.85, -87.65),
            member("4", Some("1"), 41.87, -87.66),
            member("5", Some("1"), 41.95, -87.60),
        ];
        let first = build_clusters(&analysis(), &members);
        let second = build_clusters(&analysis(), &members);
        assert_eq!(
            vertex_set(&first["1"].boundary),
            vertex_set(&second["1"].boundary)
        );
    }

    #[test]
    fn builds_each_analysis_independently() {
        let mut assignments = BTreeMap::new();
        assignments.insert(
            AnalysisType::new("A_5mi"),
            vec![member("1", Some("1"), 0.0, 0.0)],
        );
        assignments.insert(
            AnalysisType::new("AB_5mi"),
            vec![
                member("1", Some("3"), 0.0, 0.0),
                member("2", Some("4"), 0.0, 1.0),
            ],
        );
        let all = build_all(&assignments);
        assert_eq!(all[&AnalysisType::new("A_5mi")].len(), 1);
        assert_eq!(all[&AnalysisType::new("AB_5mi")].len(), 2);
        assert_eq!(
            all[&AnalysisType::new("AB_5mi")]["3"].analysis.as_str(),
            "AB_5mi"
        );
    }
}
