//! Structured trip parameters handed in by the orchestration layer
//!
//! The upstream free-text extraction is out of scope; this is the shape it
//! delivers. Everything but the destination is optional and the aggregator
//! must tolerate absence.

use serde::{Deserialize, Serialize};

/// One parsed travel request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TripQuery {
    pub destination: String,
    /// Trip length, free-form (e.g. "7 days")
    #[serde(default)]
    pub duration: Option<String>,
    /// e.g. "family", "solo"
    #[serde(default)]
    pub traveler_type: Option<String>,
    #[serde(default)]
    pub interests: Option<String>,
    #[serde(default)]
    pub budget: Option<String>,
    /// `YYYY-MM-DD` when given
    #[serde(default)]
    pub departure_date: Option<String>,
    /// Origin city/country; also used as the passport country for visa lookups
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub intent: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_destination_is_required() {
        let query: TripQuery = serde_json::from_str(r#"{"destination": "Paris"}"#).unwrap();
        assert_eq!(query.destination, "Paris");
        assert!(query.origin.is_none());
        assert!(query.departure_date.is_none());
    }
}
