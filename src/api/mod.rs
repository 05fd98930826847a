//! REST provider adapters
//!
//! Each adapter wraps one external source behind the [`ProviderResult`]
//! contract: it issues a single bounded-timeout request, normalizes the body
//! into a typed model on success, and folds every fault into a typed failure.

pub mod flights;
pub mod weather;

pub use flights::FlightsClient;
pub use weather::WeatherClient;

use crate::models::{AirportRecord, FlightSearchResult};
use crate::provider::ProviderResult;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;

/// User agent sent with every outbound request
pub(crate) const USER_AGENT: &str = concat!("TripScout/", env!("CARGO_PKG_VERSION"));

/// Build a reqwest client with the adapter's bounded timeout
pub(crate) fn http_client(timeout_seconds: u32) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_seconds.into()))
        .user_agent(USER_AGENT)
        .build()
        .with_context(|| "Failed to create HTTP client")
}

/// Airport search by free-text place name.
///
/// A trait seam so the place resolver and `plan_flights` can be composed
/// against any directory implementation.
#[async_trait]
pub trait AirportSearch: Send + Sync {
    /// Raw airport entries matching `place`, optionally narrowed by country
    async fn search_airports(
        &self,
        place: &str,
        country: Option<&str>,
    ) -> ProviderResult<Vec<AirportRecord>>;
}

/// Flight search between two IATA codes
#[async_trait]
pub trait FlightSearch: Send + Sync {
    async fn find_flights(
        &self,
        origin: &str,
        destination: &str,
        departure_date: Option<&str>,
    ) -> ProviderResult<FlightSearchResult>;
}
