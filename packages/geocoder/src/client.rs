//! Bounded-retry wrapper around a [`Geocoder`].
//!
//! Retries are sequential with a fixed sleep between attempts, and only
//! for timeouts. Any other error is logged and reported the same way as
//! "no match": callers see `None` either way and move on to their next
//! strategy.

use std::time::Duration;

use zip_cluster_geography_models::Coordinate;

use crate::{GeocodeQuery, Geocoder};

/// How often and how patiently a lookup is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per lookup, including the first.
    pub max_attempts: u32,
    /// Sleep between attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(2),
        }
    }
}

/// Issues lookups against a [`Geocoder`] with a [`RetryPolicy`].
pub struct GeocodeClient<G> {
    geocoder: G,
    policy: RetryPolicy,
}

impl<G: Geocoder> GeocodeClient<G> {
    #[must_use]
    pub const fn new(geocoder: G, policy: RetryPolicy) -> Self {
        Self { geocoder, policy }
    }

    /// The underlying provider.
    #[must_use]
    pub const fn geocoder(&self) -> &G {
        &self.geocoder
    }

    #[must_use]
    pub const fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Looks up `query`, retrying timeouts up to the policy bound.
    pub async fn lookup(&self, query: &GeocodeQuery) -> Option<Coordinate> {
        let max_attempts = self.policy.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            match self.geocoder.geocode(query).await {
                Ok(None) => return None,
                Ok(Some(hit)) => {
                    log::debug!(
                        "Matched '{query}' to {} ({})",
                        hit.coordinate,
                        hit.matched_address.as_deref().unwrap_or("no display name"),
                    );
                    return Some(hit.coordinate);
                }
                Err(e) if e.is_timeout() => {
                    if attempt == max_attempts {
                        log::warn!("Failed after {max_attempts} attempts: {e}");
                        return None;
                    }
                    log::warn!("Attempt {attempt} failed, retrying...");
                    tokio::time::sleep(self.policy.delay).await;
                }
                Err(e) => {
                    log::warn!("Lookup of '{query}' failed: {e}");
                    return None;
                }
            }
        }

        None
    }

    /// Looks up `query` once, without retrying.
    pub async fn lookup_once(&self, query: &GeocodeQuery) -> Option<Coordinate> {
        match self.geocoder.geocode(query).await {
            Ok(hit) => hit.map(|h| h.coordinate),
            Err(e) => {
                log::warn!("Lookup of '{query}' failed: {e}");
                None
            }
        }
    }
}
