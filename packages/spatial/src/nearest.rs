//! ZIP reference set and nearest-known-point search.
//!
//! The reference set is loaded once per batch run from a prior ZIP
//! dataset and is read-only while addresses are being resolved.

use std::collections::BTreeMap;

use zip_cluster_geography_models::{Coordinate, KnownPoint};

use crate::distance::haversine_km;

/// Default search radius for the nearby-ZIP fallback.
pub const DEFAULT_MAX_DISTANCE_KM: f64 = 10.0;

/// The closest known point found by a search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nearest<'a> {
    /// The matched reference point.
    pub point: &'a KnownPoint,
    /// Its coordinate.
    pub coordinate: Coordinate,
    /// Distance from the search target.
    pub distance_km: f64,
}

/// Returns the coordinate of the point closest to `target` within
/// `max_distance_km`.
///
/// Points without a valid coordinate are skipped. On equal distances the
/// point encountered first in `points` wins.
#[must_use]
pub fn find_nearest(
    target: Coordinate,
    points: &[KnownPoint],
    max_distance_km: f64,
) -> Option<Coordinate> {
    nearest_in(target, points, max_distance_km).map(|n| n.coordinate)
}

fn nearest_in(target: Coordinate, points: &[KnownPoint], max_distance_km: f64) -> Option<Nearest<'_>> {
    let mut best: Option<Nearest<'_>> = None;

    for point in points {
        let Some(coordinate) = point.valid_coordinate() else {
            continue;
        };

        let distance_km = haversine_km(target, coordinate);
        if distance_km > max_distance_km {
            continue;
        }

        match best {
            Some(current) if distance_km >= current.distance_km => {}
            _ => {
                best = Some(Nearest {
                    point,
                    coordinate,
                    distance_km,
                });
            }
        }
    }

    best
}

/// Known ZIP points keyed by ZIP code, in dataset order.
#[derive(Debug, Clone, Default)]
pub struct ReferenceSet {
    points: Vec<KnownPoint>,
    by_zip: BTreeMap<String, usize>,
}

impl ReferenceSet {
    /// Builds a reference set. If a ZIP appears more than once, the first
    /// entry is the one returned by [`Self::get`].
    #[must_use]
    pub fn new(points: Vec<KnownPoint>) -> Self {
        let mut by_zip = BTreeMap::new();
        for (idx, point) in points.iter().enumerate() {
            by_zip.entry(point.zip.clone()).or_insert(idx);
        }
        Self { points, by_zip }
    }

    /// All points in dataset order.
    #[must_use]
    pub fn points(&self) -> &[KnownPoint] {
        &self.points
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Looks up the entry for a ZIP code.
    #[must_use]
    pub fn get(&self, zip: &str) -> Option<&KnownPoint> {
        self.by_zip.get(zip).map(|&idx| &self.points[idx])
    }

    /// Coordinate of the entry keyed by `zip`, if it has a valid one.
    #[must_use]
    pub fn exact(&self, zip: &str) -> Option<Coordinate> {
        self.get(zip).and_then(KnownPoint::valid_coordinate)
    }

    /// Closest point to `target` within `max_distance_km`.
    #[must_use]
    pub fn nearest_within(&self, target: Coordinate, max_distance_km: f64) -> Option<Nearest<'_>> {
        nearest_in(target, &self.points, max_distance_km)
    }
}

impl FromIterator<KnownPoint> for ReferenceSet {
    fn from_iter<I: IntoIterator<Item = KnownPoint>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::EARTH_RADIUS_KM;

    /// Degrees of latitude spanning `km` along a meridian.
    fn lat_degrees(km: f64) -> f64 {
        km / (EARTH_RADIUS_KM * std::f64::consts::PI / 180.0)
    }

    fn point(zip: &str, latitude: f64, longitude: f64) -> KnownPoint {
        KnownPoint {
            zip: zip.to_string(),
            coordinate: Some(Coordinate::new(latitude, longitude).unwrap()),
            population: None,
            median_income: None,
        }
    }

    fn origin() -> Coordinate {
        Coordinate::new(0.0, 0.0).unwrap()
    }

    #[test]
    fn returns_none_just_outside_bound() {
        let points = vec![point("10001", lat_degrees(10.01), 0.0)];
        assert!(find_nearest(origin(), &points, DEFAULT_MAX_DISTANCE_KM).is_none());
    }

    #[test]
    fn returns_candidate_just_inside_bound() {
        let points = vec![point("10001", lat_degrees(9.99), 0.0)];
        let found = find_nearest(origin(), &points, DEFAULT_MAX_DISTANCE_KM).unwrap();
        assert!((found.latitude - lat_degrees(9.99)).abs() < 1e-12);
    }

    #[test]
    fn bound_is_inclusive() {
        let candidate = point("10001", lat_degrees(7.5), 0.0);
        let exact = haversine_km(origin(), candidate.coordinate.unwrap());
        assert!(find_nearest(origin(), &[candidate], exact).is_some());
    }

    #[test]
    fn picks_closest_candidate() {
        let points = vec![
            point("10001", lat_degrees(8.0), 0.0),
            point("10002", lat_degrees(3.0), 0.0),
            point("10003", lat_degrees(5.0), 0.0),
        ];
        let set = ReferenceSet::new(points);
        let nearest = set.nearest_within(origin(), DEFAULT_MAX_DISTANCE_KM).unwrap();
        assert_eq!(nearest.point.zip, "10002");
        assert!((nearest.distance_km - 3.0).abs() < 1e-9);
    }

    #[test]
    fn ties_go_to_first_in_input_order() {
        let points = vec![
            point("20001", lat_degrees(4.0), 0.0),
            point("20002", -lat_degrees(4.0), 0.0),
        ];
        let set = ReferenceSet::new(points);
        let nearest = set.nearest_within(origin(), DEFAULT_MAX_DISTANCE_KM).unwrap();
        assert_eq!(nearest.point.zip, "20001");
    }

    #[test]
    fn skips_points_without_coordinates() {
        let points = vec![
            KnownPoint {
                zip: "30001".to_string(),
                coordinate: None,
                population: Some(10),
                median_income: None,
            },
            KnownPoint {
                zip: "30002".to_string(),
                coordinate: Some(Coordinate {
                    latitude: f64::NAN,
                    longitude: 0.0,
                }),
                population: None,
                median_income: None,
            },
            point("30003", lat_degrees(6.0), 0.0),
        ];
        let set = ReferenceSet::new(points);
        let nearest = set.nearest_within(origin(), DEFAULT_MAX_DISTANCE_KM).unwrap();
        assert_eq!(nearest.point.zip, "30003");
    }

    #[test]
    fn exact_zip_lookup() {
        let set: ReferenceSet = vec![point("62704", 39.77, -89.68), point("62704", 1.0, 1.0)]
            .into_iter()
            .collect();
        let coordinate = set.exact("62704").unwrap();
        assert!((coordinate.latitude - 39.77).abs() < 1e-12);
        assert!(set.exact("62701").is_none());
    }

    #[test]
    fn exact_lookup_ignores_entry_without_coordinate() {
        let set = ReferenceSet::new(vec![KnownPoint {
            zip: "62704".to_string(),
            coordinate: None,
            population: None,
            median_income: None,
        }]);
        assert!(set.get("62704").is_some());
        assert!(set.exact("62704").is_none());
    }

    #[test]
    fn empty_set_finds_nothing() {
        let set = ReferenceSet::default();
        assert!(set.is_empty());
        assert!(set.nearest_within(origin(), DEFAULT_MAX_DISTANCE_KM).is_none());
    }
}
