//! Sequential batch driver over an [`AddressResolver`].
//!
//! Records are resolved one at a time, each fully (retries included)
//! before the next begins, with a fixed courtesy delay between records
//! to respect the provider's rate limit. One record failing never stops
//! the batch: it is reported as unresolved and counted.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use zip_cluster_geography_models::{Coordinate, RawAddress, ResolutionResult, ResolutionStrategy};

use crate::Geocoder;
use crate::resolver::AddressResolver;

/// Batch driver settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    /// Wait after each resolved-or-failed record before starting the next.
    pub courtesy_delay: Duration,
    /// When `false`, records that already carry valid coordinates are kept
    /// as-is and not looked up.
    pub reresolve_existing: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            courtesy_delay: Duration::from_secs(1),
            reresolve_existing: true,
        }
    }
}

/// What happened to one record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RecordOutcome {
    /// Previous coordinates were kept without a lookup.
    Kept(Coordinate),
    /// The resolution chain ran.
    Attempted(ResolutionResult),
}

impl RecordOutcome {
    /// The record's coordinate after the batch, if any.
    #[must_use]
    pub const fn coordinate(&self) -> Option<Coordinate> {
        match self {
            Self::Kept(coordinate) => Some(*coordinate),
            Self::Attempted(result) => result.coordinate(),
        }
    }
}

/// Per-record outcomes and aggregate counts for a batch run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    /// One outcome per input record, in input order.
    pub outcomes: Vec<RecordOutcome>,
    /// Records resolved by this run.
    pub resolved: u64,
    /// Records for which every strategy failed.
    pub unresolved: u64,
    /// Records kept from a previous run.
    pub skipped: u64,
    /// How many records each strategy resolved.
    pub by_strategy: BTreeMap<ResolutionStrategy, u64>,
}

impl BatchReport {
    /// Records that have coordinates after the run.
    #[must_use]
    pub const fn with_coordinates(&self) -> u64 {
        self.resolved + self.skipped
    }
}

/// Multi-line run summary: resolved, unresolved and kept counts, then one
/// line per strategy that resolved anything.
impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Successfully geocoded: {}", self.resolved)?;
        writeln!(f, "Failed to geocode: {}", self.unresolved)?;
        write!(f, "Kept previous coordinates: {}", self.skipped)?;
        for (strategy, count) in &self.by_strategy {
            let strategy = strategy.to_string();
            write!(f, "\n  {strategy:<20} {count}")?;
        }
        Ok(())
    }
}

/// Resolves every record in `records`, in order.
pub async fn resolve_batch<G: Geocoder>(
    resolver: &AddressResolver<G>,
    records: &[RawAddress],
    options: BatchOptions,
) -> BatchReport {
    let mut report = BatchReport::default();
    let total = records.len();

    for (i, record) in records.iter().enumerate() {
        if !options.reresolve_existing
            && let Some(previous) = record.previous.filter(Coordinate::is_valid)
        {
            log::debug!("Keeping previous coordinates for: {}", record.address);
            report.skipped += 1;
            report.outcomes.push(RecordOutcome::Kept(previous));
            continue;
        }

        log::info!("Processing {} of {total}: {}", i + 1, record.address);

        let result = resolver.resolve(record).await;
        match result {
            ResolutionResult::Resolved {
                coordinate,
                strategy,
            } => {
                log::info!("Successfully geocoded to: {coordinate}");
                report.resolved += 1;
                *report.by_strategy.entry(strategy).or_default() += 1;
            }
            ResolutionResult::Unresolved => {
                log::warn!("Failed to geocode address: {}", record.address);
                report.unresolved += 1;
            }
        }
        report.outcomes.push(RecordOutcome::Attempted(result));

        if i + 1 < total && !options.courtesy_delay.is_zero() {
            tokio::time::sleep(options.courtesy_delay).await;
        }
    }

    log::info!(
        "Geocoding complete: {} resolved, {} unresolved, {} kept",
        report.resolved,
        report.unresolved,
        report.skipped
    );

    report
}
