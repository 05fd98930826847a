//! LLM-backed structured extraction
//!
//! Converts unstructured visa page text into a [`VisaInfo`] record through an
//! OpenAI-compatible chat-completions endpoint. The client owns its API key
//! and HTTP session; it is constructed once and injected wherever extraction
//! is needed, never held as ambient global state.

use crate::config::LlmConfig;
use crate::models::VisaInfo;
use crate::{Result, TripScoutError};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument};

/// Keep prompts bounded; scraped pages can be enormous
const MAX_EXTRACT_CHARS: usize = 12_000;

const SYSTEM_PROMPT: &str = "You extract visa requirement details from travel web page text. \
Respond with a single JSON object with these fields: \
visa_type (one of: visa_free, visa_on_arrival, e_visa, visa_required, unknown), \
max_stay_days (integer or null), processing_time, validity_period, cost, \
requirements (list of strings), special_notes (list of strings), \
reciprocity_info, embassy_info, last_updated, \
confidence_level (your confidence in the extraction, 0.0 to 1.0). \
Focus on the visa type, the maximum stay, processing time and required documents, \
and any special conditions or restrictions. \
Use null for anything the text does not state. Do not invent details.";

/// Turns free text plus a (destination, passport) pair into a structured
/// visa record
#[async_trait]
pub trait VisaExtractor: Send + Sync {
    async fn extract_visa_info(
        &self,
        page_text: &str,
        destination: &str,
        passport: &str,
    ) -> Result<VisaInfo>;
}

/// Response from the chat-completions endpoint
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

/// [`VisaExtractor`] backed by an OpenAI-compatible API
pub struct OpenAiExtractor {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiExtractor {
    /// Create a new extractor; fails fast on a missing API key
    pub fn new(config: &LlmConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(TripScoutError::config("LLM API key is required"));
        }

        let client = crate::api::http_client(config.timeout_seconds)
            .map_err(|e| TripScoutError::config(e.to_string()))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl VisaExtractor for OpenAiExtractor {
    #[instrument(skip(self, page_text), fields(chars = page_text.len()))]
    async fn extract_visa_info(
        &self,
        page_text: &str,
        destination: &str,
        passport: &str,
    ) -> Result<VisaInfo> {
        let user_prompt = format!(
            "Destination country: {destination}\nPassport country: {passport}\n\nPage text:\n{}",
            truncate_chars(page_text, MAX_EXTRACT_CHARS)
        );

        let body = json!({
            "model": self.model,
            "response_format": { "type": "json_object" },
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": user_prompt },
            ],
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| TripScoutError::extraction(format!("LLM request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TripScoutError::extraction(format!(
                "LLM endpoint answered with status {status}"
            )));
        }

        let reply: ChatResponse = response
            .json()
            .await
            .map_err(|e| TripScoutError::extraction(format!("unreadable LLM response: {e}")))?;

        let content = reply
            .choices
            .first()
            .map(|choice| choice.message.content.as_str())
            .ok_or_else(|| TripScoutError::extraction("LLM response carried no choices"))?;

        debug!("parsing LLM extraction reply");
        parse_extraction_reply(content, destination, passport)
    }
}

/// Parse the model's JSON reply into a [`VisaInfo`], tolerating code fences
/// and clamping the self-reported confidence into [0, 1]
pub(crate) fn parse_extraction_reply(
    reply: &str,
    destination: &str,
    passport: &str,
) -> Result<VisaInfo> {
    let stripped = strip_code_fence(reply);
    let mut info: VisaInfo = serde_json::from_str(stripped)
        .map_err(|e| TripScoutError::extraction(format!("LLM reply was not valid JSON: {e}")))?;

    info.destination_country = destination.to_string();
    info.passport_country = passport.to_string();
    info.confidence_level = info.confidence_level.clamp(0.0, 1.0);
    Ok(info)
}

fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let trimmed = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    trimmed.strip_suffix("```").unwrap_or(trimmed).trim()
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
