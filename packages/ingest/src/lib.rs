#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CSV collaborators for the zip-cluster toolchain.
//!
//! [`addresses`] reads an address table, hands its rows to the geocoder as
//! [`RawAddress`](zip_cluster_geography_models::RawAddress) values and
//! writes the resolved coordinates back. [`zips`] reads the clustered ZIP
//! table that serves both as the nearby-ZIP reference set and as the source
//! of cluster assignments.

pub mod addresses;
pub mod zips;

use thiserror::Error;

pub use addresses::AddressTable;
pub use zips::ZipTable;

/// Errors from reading or writing CSV tables.
#[derive(Debug, Error)]
pub enum IngestError {
    /// CSV parse or write error.
    #[error(transparent)]
    Csv(#[from] csv::Error),
    /// I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// A column the table cannot work without is absent.
    #[error("CSV is missing required column '{0}'")]
    MissingColumn(String),
}

/// Shared reader settings: ragged rows are tolerated and padded by callers.
fn reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder.flexible(true);
    builder
}

/// Header names with surrounding whitespace removed.
fn trimmed_headers<R: std::io::Read>(
    reader: &mut csv::Reader<R>,
) -> Result<Vec<String>, IngestError> {
    Ok(reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_owned())
        .collect())
}

fn column_index(headers: &[String], name: &str) -> Option<usize> {
    headers.iter().position(|h| h == name)
}

fn require_column(headers: &[String], name: &str) -> Result<usize, IngestError> {
    column_index(headers, name).ok_or_else(|| IngestError::MissingColumn(name.to_owned()))
}

/// Parses a numeric cell, tolerating thousands separators and a trailing
/// `+` (as in `"250,000+"`). Empty or unparsable cells are `None`.
fn parse_number(cell: &str) -> Option<f64> {
    let cleaned: String = cell
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '+')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}
