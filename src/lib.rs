//! `TripScout` - multi-source travel data aggregation
//!
//! This library queries heterogeneous, unreliable third-party sources
//! (weather and flight REST APIs, scraped visa pages, a form-driven lookup
//! tool), normalizes their responses into a uniform schema, and degrades
//! gracefully when any source fails. It is consumed by an orchestration
//! layer that turns free-text travel requests into [`models::TripQuery`]
//! values and composes the final itinerary; those concerns live outside this
//! crate.

pub mod aggregator;
pub mod api;
pub mod config;
pub mod error;
pub mod llm;
pub mod logging;
pub mod models;
pub mod place_resolver;
pub mod provider;
pub mod visa;

// Re-export core types for public API
pub use aggregator::{TravelDataAggregator, TravelDataBundle};
pub use api::{AirportSearch, FlightSearch, FlightsClient, WeatherClient};
pub use config::TripScoutConfig;
pub use error::TripScoutError;
pub use llm::{OpenAiExtractor, VisaExtractor};
pub use models::{
    AggregatedVisaResult, AirportCandidate, DailyForecast, FlightInfo, FlightSearchResult,
    ResolvedPlace, TripQuery, VisaInfo, VisaType, WeatherForecast,
};
pub use place_resolver::PlaceResolver;
pub use provider::{FailureKind, ProviderError, ProviderResult};
pub use visa::{VisaCache, VisaPipeline, VisaStrategy};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, TripScoutError>;
