//! Place resolution
//!
//! Maps a free-text place name to airport candidates through the airport
//! search provider. Resolution is a best-effort heuristic: candidates with
//! "international" in their name sort first, then alphabetically, and the
//! first candidate is treated as the most likely main airport. No verified
//! designation is implied.

use crate::api::AirportSearch;
use crate::models::{AirportCandidate, ResolvedPlace};
use crate::provider::ProviderResult;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Default number of candidates to return
pub const DEFAULT_MAX_CANDIDATES: usize = 3;

/// Service for resolving free-text place names
pub struct PlaceResolver;

impl PlaceResolver {
    /// Resolve a place to at most `max_results` airport candidates.
    ///
    /// Any provider fault yields an empty list, never an error.
    pub async fn resolve_airports<S: AirportSearch + ?Sized>(
        search: &S,
        place: &str,
        country: Option<&str>,
        max_results: usize,
    ) -> Vec<AirportCandidate> {
        debug!(place, ?country, "resolving place to airport candidates");

        match search.search_airports(place, country).await {
            ProviderResult::Success { data } => rank_airports(data, max_results),
            ProviderResult::Failure { error, .. } => {
                warn!(%error, place, "airport lookup failed, returning no candidates");
                Vec::new()
            }
        }
    }

    /// The IATA code of the most likely main airport for a place, when any
    /// candidate exists
    pub async fn main_airport_for<S: AirportSearch + ?Sized>(
        search: &S,
        place: &str,
        country: Option<&str>,
    ) -> Option<String> {
        Self::resolve_airports(search, place, country, DEFAULT_MAX_CANDIDATES)
            .await
            .into_iter()
            .next()
            .map(|candidate| candidate.iata_code)
    }

    /// Resolve a place into a [`ResolvedPlace`] carrying whatever was found
    pub async fn resolve<S: AirportSearch + ?Sized>(
        search: &S,
        place: &str,
        country: Option<&str>,
    ) -> ResolvedPlace {
        let best = Self::resolve_airports(search, place, country, DEFAULT_MAX_CANDIDATES)
            .await
            .into_iter()
            .next();

        ResolvedPlace {
            display_name: place.to_string(),
            iata_code: best.as_ref().map(|c| c.iata_code.clone()),
            country_name: best.and_then(|c| c.country),
        }
    }
}

/// Filter raw entries to those carrying a IATA code, order them
/// international-first then alphabetically, de-duplicate by code and truncate
pub(crate) fn rank_airports(
    records: Vec<crate::models::AirportRecord>,
    max_results: usize,
) -> Vec<AirportCandidate> {
    let mut candidates: Vec<AirportCandidate> = records
        .into_iter()
        .filter_map(|record| {
            let iata_code = record.iata_code.filter(|code| !code.is_empty())?;
            Some(AirportCandidate {
                airport_name: record.airport_name.unwrap_or_default(),
                iata_code,
                city: record.city,
                country: record.country,
            })
        })
        .collect();

    candidates.sort_by(|a, b| {
        let a_not_intl = !a.airport_name.to_lowercase().contains("international");
        let b_not_intl = !b.airport_name.to_lowercase().contains("international");
        a_not_intl
            .cmp(&b_not_intl)
            .then_with(|| a.airport_name.cmp(&b.airport_name))
    });

    let mut seen = HashSet::new();
    let mut top = Vec::new();
    for candidate in candidates {
        if seen.insert(candidate.iata_code.clone()) {
            top.push(candidate);
        }
        if top.len() >= max_results {
            break;
        }
    }
    top
}
