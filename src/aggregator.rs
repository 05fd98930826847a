//! Aggregator facade
//!
//! One entry point per travel facet. Every entry point preserves source
//! attribution, folds internal failures into the returned value and never
//! raises, so the absence of one facet can never block presentation of the
//! others.

use crate::api::{FlightsClient, WeatherClient, flights};
use crate::config::TripScoutConfig;
use crate::llm::OpenAiExtractor;
use crate::models::{
    AggregatedVisaResult, FlightSearchResult, RouteListing, TripQuery, WeatherForecast,
};
use crate::provider::ProviderResult;
use crate::visa::VisaPipeline;
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, instrument};

/// Days of weather to collect when assembling a full bundle
pub const DEFAULT_FORECAST_DAYS: usize = 5;

/// Everything the narrative composer needs for one trip, with per-facet
/// provenance and error markers
#[derive(Debug, Clone, Serialize)]
pub struct TravelDataBundle {
    pub query: TripQuery,
    pub weather: ProviderResult<WeatherForecast>,
    /// `None` when no origin was given, so no flight search was attempted
    pub flights: Option<ProviderResult<FlightSearchResult>>,
    pub visa: AggregatedVisaResult,
    pub collected_at: DateTime<Utc>,
}

/// Facade over all provider adapters, constructed once from configuration
/// and passed to the orchestration layer
pub struct TravelDataAggregator {
    weather: WeatherClient,
    flights: FlightsClient,
    visa: VisaPipeline,
}

impl TravelDataAggregator {
    /// Construct all clients. This is the fail-fast boundary: a missing
    /// credential errors here instead of degrading every later call.
    pub fn new(config: &TripScoutConfig) -> Result<Self> {
        let extractor = OpenAiExtractor::new(&config.llm)?;
        Ok(Self {
            weather: WeatherClient::new(&config.weather)?,
            flights: FlightsClient::new(&config.flights)?,
            visa: VisaPipeline::new(&config.visa, Box::new(extractor))?,
        })
    }

    /// Assemble a facade from explicit parts
    pub fn with_parts(
        weather: WeatherClient,
        flights: FlightsClient,
        visa: VisaPipeline,
    ) -> Self {
        Self {
            weather,
            flights,
            visa,
        }
    }

    /// Weather forecast for a city
    pub async fn weather_forecast(
        &self,
        city: &str,
        days: usize,
    ) -> ProviderResult<WeatherForecast> {
        self.weather.get_forecast(city, days).await
    }

    /// Resolve two free-text places and search flights between them
    pub async fn plan_flights(
        &self,
        origin_place: &str,
        dest_place: &str,
        departure_date: Option<&str>,
    ) -> ProviderResult<FlightSearchResult> {
        flights::plan_flights(&self.flights, origin_place, dest_place, departure_date).await
    }

    /// Scheduled routes between two IATA codes
    pub async fn route_listing(
        &self,
        origin: &str,
        destination: &str,
    ) -> ProviderResult<RouteListing> {
        self.flights.get_routes(origin, destination).await
    }

    /// Visa requirements from every surviving acquisition strategy
    pub async fn visa_requirements(
        &self,
        destination: &str,
        passport: Option<&str>,
    ) -> AggregatedVisaResult {
        self.visa
            .scrape_visa_requirements(destination, passport)
            .await
    }

    /// Collect every facet for one trip request.
    ///
    /// Facets are gathered sequentially in the order weather, flights, visa;
    /// each degrades independently. The origin, when given, doubles as the
    /// passport country for the visa lookup.
    #[instrument(skip(self), fields(destination = %query.destination))]
    pub async fn collect(&self, query: &TripQuery) -> TravelDataBundle {
        let weather = self
            .weather_forecast(&query.destination, DEFAULT_FORECAST_DAYS)
            .await;

        let flights = match query.origin.as_deref() {
            Some(origin) => Some(
                self.plan_flights(origin, &query.destination, query.departure_date.as_deref())
                    .await,
            ),
            None => None,
        };

        let visa = self
            .visa_requirements(&query.destination, query.origin.as_deref())
            .await;

        info!(
            weather_ok = weather.is_success(),
            flights_searched = flights.is_some(),
            visa_sources = visa.total_sources,
            "travel data bundle collected"
        );

        TravelDataBundle {
            query: query.clone(),
            weather,
            flights,
            visa,
            collected_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{FailureKind, ProviderError};

    #[test]
    fn test_bundle_serializes_with_facet_markers() {
        let bundle = TravelDataBundle {
            query: TripQuery {
                destination: "Paris".to_string(),
                ..TripQuery::default()
            },
            weather: ProviderResult::failure(ProviderError::new(
                FailureKind::UpstreamUnavailable,
                "timeout",
                "Paris",
            )),
            flights: None,
            visa: AggregatedVisaResult {
                destination_country: "Paris".to_string(),
                passport_country: "India".to_string(),
                sources: Vec::new(),
                collected_at: Utc::now(),
                total_sources: 0,
            },
            collected_at: Utc::now(),
        };

        let json = serde_json::to_value(&bundle).unwrap();
        assert_eq!(json["weather"]["status"], "failure");
        assert_eq!(json["weather"]["error"]["kind"], "upstream_unavailable");
        assert!(json["flights"].is_null());
        assert_eq!(json["visa"]["total_sources"], 0);
    }
}
