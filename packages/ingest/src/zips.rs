//! Clustered ZIP table.
//!
//! One row per ZIP with its location and demographics, plus one cluster
//! label column per analysis type (e.g. `"ABC_10mi cluster"` holding
//! `"ABC_10mi_C4"`). The same table feeds the nearby-ZIP reference set and
//! cluster boundary construction.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use zip_cluster_clusters::analysis::{column_matches, parse_cluster_label};
use zip_cluster_geography_models::{AnalysisType, ClusterMember, Coordinate, KnownPoint};
use zip_cluster_spatial::ReferenceSet;

use crate::{IngestError, column_index, parse_number, reader_builder, require_column, trimmed_headers};

pub const ZIP_COLUMN: &str = "ZIP";
pub const LATITUDE_COLUMN: &str = "latitude";
pub const LONGITUDE_COLUMN: &str = "longitude";
pub const POPULATION_COLUMN: &str = "Total Pop";
pub const INCOME_COLUMN: &str = "Median Income";

#[derive(Debug, Clone, PartialEq)]
struct ZipRow {
    point: KnownPoint,
    cells: Vec<String>,
}

/// An in-memory clustered ZIP table.
#[derive(Debug, Clone, PartialEq)]
pub struct ZipTable {
    headers: Vec<String>,
    rows: Vec<ZipRow>,
}

impl ZipTable {
    /// Reads a table from CSV.
    ///
    /// `ZIP`, `latitude` and `longitude` are required; population and
    /// income columns are optional.
    ///
    /// # Errors
    ///
    /// * If the CSV is malformed
    /// * If a required column is missing
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, IngestError> {
        let mut reader = reader_builder().from_reader(reader);
        let headers = trimmed_headers(&mut reader)?;
        let zip_column = require_column(&headers, ZIP_COLUMN)?;
        let latitude = require_column(&headers, LATITUDE_COLUMN)?;
        let longitude = require_column(&headers, LONGITUDE_COLUMN)?;
        let population = column_index(&headers, POPULATION_COLUMN);
        let income = column_index(&headers, INCOME_COLUMN);

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let mut cells: Vec<String> = record.iter().map(str::to_owned).collect();
            cells.resize(headers.len(), String::new());

            let zip = normalize_zip(&cells[zip_column]);
            if zip.is_empty() {
                log::debug!("Skipping row without a ZIP");
                continue;
            }

            let coordinate = match (parse_number(&cells[latitude]), parse_number(&cells[longitude])) {
                (Some(lat), Some(lon)) => Coordinate::new(lat, lon)
                    .inspect_err(|e| log::debug!("Ignoring coordinate for ZIP {zip}: {e}"))
                    .ok(),
                _ => None,
            };

            let point = KnownPoint {
                zip,
                coordinate,
                population: population.and_then(|i| parse_population(&cells[i])),
                median_income: income.and_then(|i| parse_number(&cells[i])),
            };
            rows.push(ZipRow { point, cells });
        }

        log::info!("Loaded {} ZIP rows", rows.len());

        Ok(Self { headers, rows })
    }

    /// Reads a table from a CSV file.
    ///
    /// # Errors
    ///
    /// * If the file cannot be opened
    /// * If the CSV is malformed or a required column is missing
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, IngestError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Every row as a [`KnownPoint`], in row order.
    #[must_use]
    pub fn points(&self) -> Vec<KnownPoint> {
        self.rows.iter().map(|row| row.point.clone()).collect()
    }

    #[must_use]
    pub fn reference_set(&self) -> ReferenceSet {
        ReferenceSet::new(self.points())
    }

    /// The label column for `analysis`: the first column naming it as a
    /// whole token.
    #[must_use]
    pub fn cluster_column(&self, analysis: &AnalysisType) -> Option<&str> {
        self.cluster_column_index(analysis)
            .map(|i| self.headers[i].as_str())
    }

    fn cluster_column_index(&self, analysis: &AnalysisType) -> Option<usize> {
        self.headers.iter().position(|h| column_matches(h, analysis))
    }

    /// Cluster assignments for each analysis type that has a label column.
    ///
    /// Every row is included; rows with an empty label get no cluster id
    /// and are skipped later by the builder. Analysis types without a
    /// column are left out.
    #[must_use]
    pub fn cluster_members(
        &self,
        analyses: &[AnalysisType],
    ) -> BTreeMap<AnalysisType, Vec<ClusterMember>> {
        let mut assignments = BTreeMap::new();

        for analysis in analyses {
            let Some(column) = self.cluster_column_index(analysis) else {
                log::warn!("No cluster column found for {analysis}");
                continue;
            };
            log::debug!("Using column '{}' for {analysis}", self.headers[column]);

            let members = self
                .rows
                .iter()
                .map(|row| ClusterMember {
                    point: row.point.clone(),
                    cluster_id: parse_cluster_label(&row.cells[column]),
                })
                .collect();
            assignments.insert(analysis.clone(), members);
        }

        assignments
    }
}

/// Left-pads all-digit ZIPs to five digits (`"601"` becomes `"00601"`).
/// A trailing `".0"` from float-typed exports is dropped first.
fn normalize_zip(cell: &str) -> String {
    let zip = cell.trim();
    let zip = zip.strip_suffix(".0").unwrap_or(zip);
    if !zip.is_empty() && zip.len() < 5 && zip.chars().all(|c| c.is_ascii_digit()) {
        format!("{zip:0>5}")
    } else {
        zip.to_owned()
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn parse_population(cell: &str) -> Option<u64> {
    parse_number(cell)
        .filter(|v| *v >= 0.0)
        .map(|v| v.round() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
ZIP,latitude,longitude,Total Pop,Median Income,A_5mi cluster,ABC_5mi cluster,BC_5mi cluster
601,18.18,-66.75,\"17,126\",\"250,000+\",A_5mi_C1,ABC_5mi_C2,
60601,41.88,-87.62,15000,85000,A_5mi_C1,,BC_5mi_C7
60602,,,900,n/a,,ABC_5mi_C2,BC_5mi_C7
";

    fn table() -> ZipTable {
        ZipTable::from_reader(CSV.as_bytes()).unwrap()
    }

    #[test]
    fn pads_zips_and_parses_numbers() {
        let points = table().points();
        assert_eq!(points.len(), 3);

        assert_eq!(points[0].zip, "00601");
        assert_eq!(points[0].population, Some(17_126));
        assert_eq!(points[0].median_income, Some(250_000.0));

        assert!(points[2].coordinate.is_none());
        assert_eq!(points[2].population, Some(900));
        assert!(points[2].median_income.is_none());
    }

    #[test]
    fn builds_reference_set() {
        let reference = table().reference_set();
        assert_eq!(reference.len(), 3);
        let chicago = reference.exact("60601").unwrap();
        assert!((chicago.latitude - 41.88).abs() < 1e-12);
        assert!(reference.exact("60602").is_none());
    }

    #[test]
    fn picks_whole_token_columns() {
        let table = table();
        assert_eq!(
            table.cluster_column(&AnalysisType::new("BC_5mi")),
            Some("BC_5mi cluster")
        );
        assert_eq!(
            table.cluster_column(&AnalysisType::new("ABC_5mi")),
            Some("ABC_5mi cluster")
        );
        assert_eq!(table.cluster_column(&AnalysisType::new("A_10mi")), None);
    }

    #[test]
    fn assigns_cluster_ids() {
        let analyses = [
            AnalysisType::new("BC_5mi"),
            AnalysisType::new("A_5mi"),
            AnalysisType::new("A_10mi"),
        ];
        let assignments = table().cluster_members(&analyses);

        assert_eq!(assignments.len(), 2);
        assert!(!assignments.contains_key(&AnalysisType::new("A_10mi")));

        let bc: Vec<Option<&str>> = assignments[&AnalysisType::new("BC_5mi")]
            .iter()
            .map(|m| m.cluster_id.as_deref())
            .collect();
        assert_eq!(bc, vec![None, Some("7"), Some("7")]);

        let a: Vec<Option<&str>> = assignments[&AnalysisType::new("A_5mi")]
            .iter()
            .map(|m| m.cluster_id.as_deref())
            .collect();
        assert_eq!(a, vec![Some("1"), Some("1"), None]);
    }

    #[test]
    fn normalizes_zips() {
        assert_eq!(normalize_zip(" 601 "), "00601");
        assert_eq!(normalize_zip("2134.0"), "02134");
        assert_eq!(normalize_zip("60601"), "60601");
        assert_eq!(normalize_zip("K1A"), "K1A");
    }

    #[test]
    fn huge_population_cells_load_without_panicking() {
        let csv = "ZIP,latitude,longitude,Total Pop\n60601,41.88,-87.62,1e20\n60602,41.89,-87.63,10\n";
        let points = ZipTable::from_reader(csv.as_bytes()).unwrap().points();
        assert_eq!(points[0].population, Some(u64::MAX));
        assert_eq!(points[1].population, Some(10));
    }

    #[test]
    fn skips_rows_without_zip() {
        let csv = "ZIP,latitude,longitude\n,1,2\n60601,41.88,-87.62\n";
        let table = ZipTable::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn requires_location_columns() {
        let err = ZipTable::from_reader("ZIP,lat\n60601,41\n".as_bytes()).unwrap_err();
        assert!(matches!(err, IngestError::MissingColumn(ref c) if c == "latitude"));
    }
}
