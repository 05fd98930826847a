//! Visa requirement models
//!
//! [`VisaInfo`] is the output of an LLM extraction step, not a direct API
//! parse, so all fields are best-effort and `confidence_level` communicates
//! extraction reliability to the consumer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Visa requirement class for a destination/passport pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisaType {
    VisaFree,
    VisaOnArrival,
    EVisa,
    VisaRequired,
    #[default]
    Unknown,
}

/// Structured visa requirements extracted from unstructured page text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisaInfo {
    #[serde(default)]
    pub destination_country: String,
    #[serde(default)]
    pub passport_country: String,
    #[serde(default)]
    pub visa_type: VisaType,
    /// Maximum permitted stay in days, when stated
    #[serde(default)]
    pub max_stay_days: Option<u32>,
    #[serde(default)]
    pub processing_time: Option<String>,
    #[serde(default)]
    pub validity_period: Option<String>,
    #[serde(default)]
    pub cost: Option<String>,
    /// Required documents and conditions, in page order
    #[serde(default)]
    pub requirements: Vec<String>,
    /// Restrictions and special conditions, in page order
    #[serde(default)]
    pub special_notes: Vec<String>,
    #[serde(default)]
    pub reciprocity_info: Option<String>,
    #[serde(default)]
    pub embassy_info: Option<String>,
    /// When the source page says its information was last updated
    #[serde(default)]
    pub last_updated: Option<String>,
    /// Self-reported extraction confidence in [0, 1]; not independently
    /// verified by the pipeline
    #[serde(default)]
    pub confidence_level: f64,
}

impl VisaInfo {
    /// An empty record for a destination/passport pair, used as the base the
    /// extractor fills in
    pub fn unknown(destination: &str, passport: &str) -> Self {
        Self {
            destination_country: destination.to_string(),
            passport_country: passport.to_string(),
            visa_type: VisaType::Unknown,
            max_stay_days: None,
            processing_time: None,
            validity_period: None,
            cost: None,
            requirements: Vec::new(),
            special_notes: Vec::new(),
            reciprocity_info: None,
            embassy_info: None,
            last_updated: None,
            confidence_level: 0.0,
        }
    }
}

/// Visa data from one acquisition strategy, kept with its provenance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisaSource {
    /// Strategy that produced this record, e.g. "static_page"
    pub source: String,
    pub info: VisaInfo,
}

/// Visa data from every surviving strategy, side by side.
///
/// Sources are deliberately not merged into one record; reconciling
/// discrepancies is left to the downstream itinerary composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedVisaResult {
    pub destination_country: String,
    pub passport_country: String,
    pub sources: Vec<VisaSource>,
    pub collected_at: DateTime<Utc>,
    pub total_sources: usize,
}
