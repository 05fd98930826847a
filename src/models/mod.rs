//! Data models for the `TripScout` library
//!
//! This module contains the normalized domain models organized by travel
//! facet:
//! - Weather: daily forecasts picked from the 3-hourly upstream feed
//! - Flights: flight search results, routes and airport candidates
//! - Visa: LLM-extracted visa requirements with source provenance
//! - Trip: the structured trip parameters handed in by the orchestrator

pub mod flights;
pub mod trip;
pub mod visa;
pub mod weather;

// Re-export all public types for convenient access
pub use flights::{
    AirportCandidate, AirportRecord, FlightEndpoint, FlightInfo, FlightSearchResult, ResolvedPlace,
    RouteInfo, RouteListing,
};
pub use trip::TripQuery;
pub use visa::{AggregatedVisaResult, VisaInfo, VisaSource, VisaType};
pub use weather::{DailyForecast, WeatherForecast};
