//! Normalized flight, route and airport models

use serde::{Deserialize, Serialize};

/// Departure or arrival details for one flight.
///
/// Every field is optional upstream; `None` means "not available" and is
/// always serialized so consumers see a stable field set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlightEndpoint {
    pub airport: Option<String>,
    pub scheduled: Option<String>,
    pub estimated: Option<String>,
    pub terminal: Option<String>,
    pub gate: Option<String>,
}

/// One flight on the searched route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightInfo {
    /// Airline IATA prefix plus flight number, e.g. "AI162"
    pub flight_number: String,
    pub airline: String,
    /// Aircraft registration when reported
    pub aircraft: Option<String>,
    pub departure: FlightEndpoint,
    pub arrival: FlightEndpoint,
    pub status: String,
}

/// Flight search result for one origin/destination pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightSearchResult {
    pub origin: String,
    pub destination: String,
    /// At most [`crate::api::flights::MAX_FLIGHT_RESULTS`] flights, upstream order
    pub flights: Vec<FlightInfo>,
    /// Requested date, or "Live data" when searching current data
    pub search_date: String,
    /// Set on success; describes the freshness of the data served
    pub note: Option<String>,
    /// Set when the provider answered but found nothing
    pub error: Option<String>,
    pub suggestion: Option<String>,
}

/// One scheduled route between two airports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteInfo {
    pub airline: String,
    pub airline_iata: Option<String>,
    pub flight_number: Option<String>,
    pub departure_airport: Option<String>,
    pub arrival_airport: Option<String>,
}

/// Route listing between two airports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteListing {
    pub origin: String,
    pub destination: String,
    pub routes: Vec<RouteInfo>,
    pub total_routes: usize,
    /// Set when the provider answered but knows no route
    pub message: Option<String>,
}

/// Raw airport entry as reported by the airport-search provider, before the
/// resolver filters and ranks it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AirportRecord {
    pub airport_name: Option<String>,
    pub iata_code: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
}

/// Airport candidate produced by the place resolver: guaranteed to carry a
/// IATA code, ranked international-first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirportCandidate {
    pub airport_name: String,
    pub iata_code: String,
    pub city: Option<String>,
    pub country: Option<String>,
}

/// A free-text place after best-effort resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedPlace {
    /// The place name as the caller gave it
    pub display_name: String,
    pub iata_code: Option<String>,
    pub country_name: Option<String>,
}
