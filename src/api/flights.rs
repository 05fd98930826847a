//! Flight data provider adapter (AviationStack)
//!
//! Wraps the `/flights`, `/routes` and `/airports` endpoints. Flight results
//! are capped at [`MAX_FLIGHT_RESULTS`] entries in upstream order; the cap is
//! a display-size choice, not a correctness limit.

use crate::config::FlightsConfig;
use crate::models::{
    AirportRecord, FlightEndpoint, FlightInfo, FlightSearchResult, RouteInfo, RouteListing,
};
use crate::place_resolver::PlaceResolver;
use crate::provider::{FailureKind, ProviderError, ProviderResult};
use anyhow::Result;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use super::{AirportSearch, FlightSearch};

/// Maximum number of flights returned per search
pub const MAX_FLIGHT_RESULTS: usize = 5;
/// How many flights to request upstream before capping
const UPSTREAM_FLIGHT_LIMIT: usize = 10;

/// Flight data API client for AviationStack
pub struct FlightsClient {
    client: reqwest::Client,
    access_key: String,
    base_url: String,
}

impl FlightsClient {
    /// Create a new flights client; fails fast on a missing access key
    pub fn new(config: &FlightsConfig) -> Result<Self> {
        if config.access_key.is_empty() {
            return Err(crate::TripScoutError::config("Flight data access key is required").into());
        }

        Ok(Self {
            client: super::http_client(config.timeout_seconds)?,
            access_key: config.access_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Find flights between two IATA codes
    #[instrument(skip(self))]
    pub async fn find_flights(
        &self,
        origin: &str,
        destination: &str,
        departure_date: Option<&str>,
    ) -> ProviderResult<FlightSearchResult> {
        let context = format!("{origin} -> {destination}");
        let limit = UPSTREAM_FLIGHT_LIMIT.to_string();
        let mut params = vec![
            ("access_key", self.access_key.as_str()),
            ("dep_iata", origin),
            ("arr_iata", destination),
            ("limit", limit.as_str()),
        ];
        if let Some(date) = departure_date {
            params.push(("flight_date", date));
        }

        match self
            .fetch::<aviationstack::FlightsResponse>("flights", &params, &context)
            .await
        {
            Ok(response) => {
                let result =
                    normalize_flights(origin, destination, departure_date, response.data);
                debug!(flights = result.flights.len(), "normalized flight search");
                ProviderResult::success(result)
            }
            Err(error) => {
                warn!(%error, "flight search failed");
                ProviderResult::failure(error)
            }
        }
    }

    /// List scheduled routes between two airports
    #[instrument(skip(self))]
    pub async fn get_routes(
        &self,
        origin: &str,
        destination: &str,
    ) -> ProviderResult<RouteListing> {
        let context = format!("{origin} -> {destination}");
        let params = [
            ("access_key", self.access_key.as_str()),
            ("dep_iata", origin),
            ("arr_iata", destination),
        ];

        match self
            .fetch::<aviationstack::RoutesResponse>("routes", &params, &context)
            .await
        {
            Ok(response) => {
                ProviderResult::success(normalize_routes(origin, destination, response.data))
            }
            Err(error) => {
                warn!(%error, "route lookup failed");
                ProviderResult::failure(error)
            }
        }
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
        context: &str,
    ) -> Result<T, ProviderError> {
        let url = format!("{}/{endpoint}", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| {
                ProviderError::new(
                    FailureKind::UpstreamUnavailable,
                    format!("could not reach flight data provider: {e}"),
                    context,
                )
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::new(
                FailureKind::UpstreamUnavailable,
                format!("flight data provider answered with status {status}"),
                context,
            ));
        }

        response.json().await.map_err(|e| {
            ProviderError::new(
                FailureKind::MalformedResponse,
                format!("could not parse flight data response: {e}"),
                context,
            )
        })
    }
}

#[async_trait]
impl AirportSearch for FlightsClient {
    #[instrument(skip(self))]
    async fn search_airports(
        &self,
        place: &str,
        country: Option<&str>,
    ) -> ProviderResult<Vec<AirportRecord>> {
        let mut params = vec![
            ("access_key", self.access_key.as_str()),
            ("search", place),
        ];
        if let Some(country) = country {
            params.push(("country_name", country));
        }

        match self
            .fetch::<aviationstack::AirportsResponse>("airports", &params, place)
            .await
        {
            Ok(response) => ProviderResult::success(
                response
                    .data
                    .into_iter()
                    .map(|airport| AirportRecord {
                        airport_name: airport.airport_name,
                        iata_code: airport.iata_code,
                        city: airport.city_name,
                        country: airport.country_name,
                    })
                    .collect(),
            ),
            Err(error) => {
                warn!(%error, "airport lookup failed");
                ProviderResult::failure(error)
            }
        }
    }
}

#[async_trait]
impl FlightSearch for FlightsClient {
    async fn find_flights(
        &self,
        origin: &str,
        destination: &str,
        departure_date: Option<&str>,
    ) -> ProviderResult<FlightSearchResult> {
        FlightsClient::find_flights(self, origin, destination, departure_date).await
    }
}

/// Resolve both places to their main airports, then search flights.
///
/// Short-circuits with an `UnresolvableEntity` failure when either place has
/// no airport candidate; the flight search is not attempted in that case.
pub async fn plan_flights<C>(
    client: &C,
    origin_place: &str,
    dest_place: &str,
    departure_date: Option<&str>,
) -> ProviderResult<FlightSearchResult>
where
    C: AirportSearch + FlightSearch,
{
    let origin = PlaceResolver::main_airport_for(client, origin_place, None).await;
    let destination = PlaceResolver::main_airport_for(client, dest_place, None).await;

    match (origin, destination) {
        (Some(origin), Some(destination)) => {
            FlightSearch::find_flights(client, &origin, &destination, departure_date).await
        }
        _ => ProviderResult::failure(ProviderError::new(
            FailureKind::UnresolvableEntity,
            format!("could not resolve airport codes for '{origin_place}' or '{dest_place}'"),
            format!("{origin_place} -> {dest_place}"),
        )),
    }
}

fn normalize_flights(
    origin: &str,
    destination: &str,
    departure_date: Option<&str>,
    data: Vec<aviationstack::Flight>,
) -> FlightSearchResult {
    let search_date = departure_date.unwrap_or("Live data").to_string();

    if data.is_empty() {
        return FlightSearchResult {
            origin: origin.to_string(),
            destination: destination.to_string(),
            flights: Vec::new(),
            search_date,
            note: None,
            error: Some("No flights found for the specified route".to_string()),
            suggestion: Some("Try checking major airport codes or different dates".to_string()),
        };
    }

    let flights = data
        .into_iter()
        .take(MAX_FLIGHT_RESULTS)
        .map(flight_info)
        .collect();

    FlightSearchResult {
        origin: origin.to_string(),
        destination: destination.to_string(),
        flights,
        search_date,
        note: Some("Live flight tracking data".to_string()),
        error: None,
        suggestion: None,
    }
}

fn flight_info(flight: aviationstack::Flight) -> FlightInfo {
    let airline = flight.airline.unwrap_or_default();
    let number = flight
        .flight
        .and_then(|f| f.number)
        .unwrap_or_default();

    FlightInfo {
        flight_number: format!(
            "{}{number}",
            airline.iata.as_deref().unwrap_or("N/A")
        ),
        airline: airline.name.unwrap_or_else(|| "Unknown".to_string()),
        aircraft: flight.aircraft.and_then(|a| a.registration),
        departure: endpoint(flight.departure),
        arrival: endpoint(flight.arrival),
        status: flight
            .flight_status
            .unwrap_or_else(|| "Unknown".to_string()),
    }
}

fn endpoint(endpoint: Option<aviationstack::Endpoint>) -> FlightEndpoint {
    let endpoint = endpoint.unwrap_or_default();
    FlightEndpoint {
        airport: endpoint.airport,
        scheduled: endpoint.scheduled,
        estimated: endpoint.estimated,
        terminal: endpoint.terminal,
        gate: endpoint.gate,
    }
}

fn normalize_routes(
    origin: &str,
    destination: &str,
    data: Vec<aviationstack::Route>,
) -> RouteListing {
    let message = if data.is_empty() {
        Some("No routes found between these airports".to_string())
    } else {
        None
    };

    let routes: Vec<RouteInfo> = data
        .into_iter()
        .map(|route| RouteInfo {
            airline: route
                .airline_name
                .unwrap_or_else(|| "Unknown".to_string()),
            airline_iata: route.airline_iata,
            flight_number: route.flight_number,
            departure_airport: route.dep_airport,
            arrival_airport: route.arr_airport,
        })
        .collect();

    RouteListing {
        origin: origin.to_string(),
        destination: destination.to_string(),
        total_routes: routes.len(),
        routes,
        message,
    }
}

/// `AviationStack` API response structures
mod aviationstack {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct FlightsResponse {
        #[serde(default)]
        pub data: Vec<Flight>,
    }

    #[derive(Debug, Default, Deserialize)]
    pub struct Flight {
        #[serde(default)]
        pub airline: Option<Airline>,
        #[serde(default)]
        pub flight: Option<FlightNumber>,
        #[serde(default)]
        pub aircraft: Option<Aircraft>,
        #[serde(default)]
        pub departure: Option<Endpoint>,
        #[serde(default)]
        pub arrival: Option<Endpoint>,
        #[serde(default)]
        pub flight_status: Option<String>,
    }

    #[derive(Debug, Default, Deserialize)]
    pub struct Airline {
        #[serde(default)]
        pub name: Option<String>,
        #[serde(default)]
        pub iata: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    pub struct FlightNumber {
        #[serde(default)]
        pub number: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Aircraft {
        #[serde(default)]
        pub registration: Option<String>,
    }

    #[derive(Debug, Default, Deserialize)]
    pub struct Endpoint {
        #[serde(default)]
        pub airport: Option<String>,
        #[serde(default)]
        pub scheduled: Option<String>,
        #[serde(default)]
        pub estimated: Option<String>,
        #[serde(default)]
        pub terminal: Option<String>,
        #[serde(default)]
        pub gate: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    pub struct RoutesResponse {
        #[serde(default)]
        pub data: Vec<Route>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Route {
        #[serde(default)]
        pub airline_name: Option<String>,
        #[serde(default)]
        pub airline_iata: Option<String>,
        #[serde(default)]
        pub flight_number: Option<String>,
        #[serde(default)]
        pub dep_airport: Option<String>,
        #[serde(default)]
        pub arr_airport: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    pub struct AirportsResponse {
        #[serde(default)]
        pub data: Vec<Airport>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Airport {
        #[serde(default)]
        pub airport_name: Option<String>,
        #[serde(default)]
        pub iata_code: Option<String>,
        #[serde(default)]
        pub city_name: Option<String>,
        #[serde(default)]
        pub country_name: Option<String>,
    }
}
