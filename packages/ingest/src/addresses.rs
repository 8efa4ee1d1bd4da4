//! Address table round trip.
//!
//! The table must have an `Address` column. `Latitude` and `Longitude`
//! columns are appended when absent. Every other column is carried through
//! untouched, in its original order.

use std::io::{Read, Write};
use std::path::Path;

use zip_cluster_geography_models::{Coordinate, RawAddress};

use crate::{IngestError, column_index, parse_number, reader_builder, require_column, trimmed_headers};

pub const ADDRESS_COLUMN: &str = "Address";
pub const LATITUDE_COLUMN: &str = "Latitude";
pub const LONGITUDE_COLUMN: &str = "Longitude";

/// An in-memory address table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    address: usize,
    latitude: usize,
    longitude: usize,
}

impl AddressTable {
    /// Reads a table from CSV.
    ///
    /// # Errors
    ///
    /// * If the CSV is malformed
    /// * If there is no `Address` column
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, IngestError> {
        let mut reader = reader_builder().from_reader(reader);
        let mut headers = trimmed_headers(&mut reader)?;
        let address = require_column(&headers, ADDRESS_COLUMN)?;
        let latitude = ensure_column(&mut headers, LATITUDE_COLUMN);
        let longitude = ensure_column(&mut headers, LONGITUDE_COLUMN);

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let mut row: Vec<String> = record.iter().map(str::to_owned).collect();
            row.resize(headers.len(), String::new());
            rows.push(row);
        }

        log::info!("Loaded {} addresses", rows.len());

        Ok(Self {
            headers,
            rows,
            address,
            latitude,
            longitude,
        })
    }

    /// Reads a table from a CSV file.
    ///
    /// # Errors
    ///
    /// * If the file cannot be opened
    /// * If the CSV is malformed or has no `Address` column
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, IngestError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// One record per row, in row order.
    ///
    /// The ZIP hint is left unset so the resolver derives it from the
    /// address text. Existing `Latitude`/`Longitude` cells become the
    /// record's previous coordinate when both parse as numbers.
    #[must_use]
    pub fn raw_addresses(&self) -> Vec<RawAddress> {
        self.rows
            .iter()
            .map(|row| {
                let mut record = RawAddress::new(row[self.address].trim());
                record.previous = self.coordinate_cells(row);
                record
            })
            .collect()
    }

    fn coordinate_cells(&self, row: &[String]) -> Option<Coordinate> {
        let latitude = parse_number(&row[self.latitude])?;
        let longitude = parse_number(&row[self.longitude])?;
        Some(Coordinate {
            latitude,
            longitude,
        })
    }

    /// Writes resolved coordinates into the rows, pairing them up in order.
    ///
    /// `None` leaves the row's coordinate cells as they were, so a row that
    /// was never resolved keeps empty cells.
    pub fn set_coordinates(&mut self, coordinates: impl IntoIterator<Item = Option<Coordinate>>) {
        for (row, coordinate) in self.rows.iter_mut().zip(coordinates) {
            if let Some(coordinate) = coordinate {
                row[self.latitude] = coordinate.latitude.to_string();
                row[self.longitude] = coordinate.longitude.to_string();
            }
        }
    }

    /// Rows whose coordinate cells are both filled with numbers.
    #[must_use]
    pub fn geocoded_count(&self) -> usize {
        self.rows
            .iter()
            .filter(|row| self.coordinate_cells(row).is_some())
            .count()
    }

    /// Writes the table as CSV.
    ///
    /// # Errors
    ///
    /// * If writing to `writer` fails
    pub fn to_writer<W: Write>(&self, writer: W) -> Result<(), IngestError> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Writes the table to a CSV file, replacing it.
    ///
    /// # Errors
    ///
    /// * If the file cannot be created or written
    pub fn write_path(&self, path: impl AsRef<Path>) -> Result<(), IngestError> {
        let file = std::fs::File::create(path)?;
        self.to_writer(file)
    }
}

fn ensure_column(headers: &mut Vec<String>, name: &str) -> usize {
    column_index(headers, name).unwrap_or_else(|| {
        headers.push(name.to_owned());
        headers.len() - 1
    })
}
