//! Weather provider adapter (OpenWeatherMap 5-day/3-hour forecast)
//!
//! The upstream returns forecast entries every three hours. For each
//! requested day we pick the entry stamped at local noon, or the first entry
//! of that day when no noon entry exists, and cap the result at
//! `min(requested days, days the source returned)`.

use crate::config::WeatherConfig;
use crate::models::{DailyForecast, WeatherForecast};
use crate::provider::{FailureKind, ProviderError, ProviderResult};
use anyhow::Result;
use tracing::{debug, instrument, warn};

/// The 3-hourly feed carries 8 entries per day
const ENTRIES_PER_DAY: usize = 8;
/// The free forecast endpoint serves at most 40 entries (5 days)
const MAX_ENTRIES: usize = 40;

/// Weather API client for OpenWeatherMap
pub struct WeatherClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl WeatherClient {
    /// Create a new weather client; fails fast on a missing API key
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(crate::TripScoutError::config("Weather API key is required").into());
        }

        Ok(Self {
            client: super::http_client(config.timeout_seconds)?,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Get the weather forecast for a city.
    ///
    /// Never returns an error: any fault becomes a `Failure` carrying the
    /// city so the consumer can render "weather unavailable for {city}".
    #[instrument(skip(self))]
    pub async fn get_forecast(&self, city: &str, days: usize) -> ProviderResult<WeatherForecast> {
        match self.fetch_forecast(city, days).await {
            Ok(response) => {
                let forecast = normalize_forecast(city, days, response);
                debug!(
                    days = forecast.total_forecasts,
                    "normalized weather forecast"
                );
                ProviderResult::success(forecast)
            }
            Err(error) => {
                warn!(%error, "weather lookup failed");
                ProviderResult::failure(error)
            }
        }
    }

    async fn fetch_forecast(
        &self,
        city: &str,
        days: usize,
    ) -> Result<openweather::ForecastResponse, ProviderError> {
        let url = format!("{}/forecast", self.base_url);
        let count = (days * ENTRIES_PER_DAY).min(MAX_ENTRIES);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
                ("cnt", &count.to_string()),
            ])
            .send()
            .await
            .map_err(|e| {
                ProviderError::new(
                    FailureKind::UpstreamUnavailable,
                    format!("could not fetch weather info: {e}"),
                    city,
                )
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::new(
                FailureKind::UpstreamUnavailable,
                format!("weather provider answered with status {status}"),
                city,
            ));
        }

        response.json().await.map_err(|e| {
            ProviderError::new(
                FailureKind::MalformedResponse,
                format!("could not parse weather response: {e}"),
                city,
            )
        })
    }
}

/// Pick one forecast per day from the 3-hourly entries
fn normalize_forecast(
    city: &str,
    days: usize,
    response: openweather::ForecastResponse,
) -> WeatherForecast {
    // Group entries by date, preserving the order dates first appear in
    let mut by_date: Vec<(String, Vec<openweather::ForecastEntry>)> = Vec::new();
    for entry in response.list {
        let date = entry
            .dt_txt
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_string();
        match by_date.iter_mut().find(|(d, _)| *d == date) {
            Some((_, entries)) => entries.push(entry),
            None => by_date.push((date, vec![entry])),
        }
    }

    let forecasts: Vec<DailyForecast> = by_date
        .into_iter()
        .take(days)
        .map(|(date, entries)| {
            // Noon entry when present, otherwise the first of the day
            let midday = entries
                .iter()
                .find(|e| e.dt_txt.contains("12:00:00"))
                .unwrap_or(&entries[0]);
            daily_forecast(date, midday)
        })
        .collect();

    WeatherForecast {
        city: city.to_string(),
        country: response.city.as_ref().and_then(|c| c.country.clone()),
        timezone_offset_s: response.city.as_ref().and_then(|c| c.timezone),
        total_forecasts: forecasts.len(),
        forecasts,
    }
}

fn daily_forecast(date: String, entry: &openweather::ForecastEntry) -> DailyForecast {
    let condition = entry.weather.first();
    DailyForecast {
        date,
        datetime: entry.dt_txt.clone(),
        temperature: entry.main.temp,
        feels_like: entry.main.feels_like,
        humidity: entry.main.humidity,
        description: condition
            .map(|c| title_case(&c.description))
            .unwrap_or_else(|| "Not Available".to_string()),
        condition: condition
            .map(|c| c.main.clone())
            .unwrap_or_else(|| "Unknown".to_string()),
        wind_speed: entry.wind.as_ref().and_then(|w| w.speed),
        cloud_pct: entry.clouds.as_ref().and_then(|c| c.all),
    }
}

/// Capitalize each word, lowercasing the rest: "LIGHT rain" -> "Light Rain"
fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// `OpenWeatherMap` API response structures
mod openweather {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct ForecastResponse {
        #[serde(default)]
        pub list: Vec<ForecastEntry>,
        pub city: Option<CityInfo>,
    }

    #[derive(Debug, Deserialize)]
    pub struct ForecastEntry {
        pub dt_txt: String,
        pub main: MainMetrics,
        #[serde(default)]
        pub weather: Vec<Condition>,
        #[serde(default)]
        pub wind: Option<Wind>,
        #[serde(default)]
        pub clouds: Option<Clouds>,
    }

    #[derive(Debug, Deserialize)]
    pub struct MainMetrics {
        pub temp: f64,
        pub feels_like: f64,
        pub humidity: f64,
    }

    #[derive(Debug, Deserialize)]
    pub struct Condition {
        pub description: String,
        pub main: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct Wind {
        #[serde(default)]
        pub speed: Option<f64>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Clouds {
        #[serde(default)]
        pub all: Option<u8>,
    }

    #[derive(Debug, Deserialize)]
    pub struct CityInfo {
        #[serde(default)]
        pub country: Option<String>,
        #[serde(default)]
        pub timezone: Option<i32>,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn entry(dt_txt: &str, temp: f64) -> serde_json::Value {
        json!({
            "dt_txt": dt_txt,
            "main": { "temp": temp, "feels_like": temp - 1.0, "humidity": 60.0 },
            "weather": [{ "description": "light rain", "main": "Rain" }],
            "wind": { "speed": 3.4 },
            "clouds": { "all": 75 }
        })
    }

    fn response(entries: Vec<serde_json::Value>) -> openweather::ForecastResponse {
        serde_json::from_value(json!({
            "list": entries,
            "city": { "country": "JP", "timezone": 32400 }
        }))
        .unwrap()
    }

    #[test]
    fn test_noon_entry_is_selected() {
        let response = response(vec![
            entry("2026-09-01 09:00:00", 21.0),
            entry("2026-09-01 12:00:00", 26.0),
            entry("2026-09-01 15:00:00", 24.0),
        ]);
        let forecast = normalize_forecast("Tokyo", 5, response);
        assert_eq!(forecast.forecasts.len(), 1);
        assert_eq!(forecast.forecasts[0].datetime, "2026-09-01 12:00:00");
        assert_eq!(forecast.forecasts[0].temperature, 26.0);
    }

    #[test]
    fn test_first_entry_fallback_without_noon() {
        let response = response(vec![
            entry("2026-09-01 15:00:00", 24.0),
            entry("2026-09-01 18:00:00", 20.0),
        ]);
        let forecast = normalize_forecast("Tokyo", 5, response);
        assert_eq!(forecast.forecasts[0].datetime, "2026-09-01 15:00:00");
    }

    #[test]
    fn test_requested_days_capped_by_source() {
        // 10 days requested against a source that served 5 days of data
        let mut entries = Vec::new();
        for day in 1..=5 {
            entries.push(entry(&format!("2026-09-0{day} 12:00:00"), 20.0));
        }
        let forecast = normalize_forecast("Tokyo", 10, response(entries));
        assert_eq!(forecast.forecasts.len(), 5);
        assert_eq!(forecast.total_forecasts, 5);
    }

    #[test]
    fn test_days_truncate_source_surplus() {
        let entries = (1..=5)
            .map(|day| entry(&format!("2026-09-0{day} 12:00:00"), 20.0))
            .collect();
        let forecast = normalize_forecast("Tokyo", 2, response(entries));
        assert_eq!(forecast.forecasts.len(), 2);
        assert_eq!(forecast.forecasts[0].date, "2026-09-01");
        assert_eq!(forecast.forecasts[1].date, "2026-09-02");
    }

    #[test]
    fn test_missing_optional_fields_become_none() {
        let response: openweather::ForecastResponse = serde_json::from_value(json!({
            "list": [{
                "dt_txt": "2026-09-01 12:00:00",
                "main": { "temp": 20.0, "feels_like": 19.0, "humidity": 50.0 },
                "weather": []
            }],
            "city": null
        }))
        .unwrap();
        let forecast = normalize_forecast("Tokyo", 5, response);
        let day = &forecast.forecasts[0];
        assert_eq!(day.wind_speed, None);
        assert_eq!(day.cloud_pct, None);
        assert_eq!(day.description, "Not Available");
        assert_eq!(day.condition, "Unknown");
        assert_eq!(forecast.country, None);
    }

    #[test]
    fn test_description_is_title_cased() {
        let forecast = normalize_forecast(
            "Tokyo",
            5,
            response(vec![entry("2026-09-01 12:00:00", 20.0)]),
        );
        assert_eq!(forecast.forecasts[0].description, "Light Rain");
        assert_eq!(forecast.forecasts[0].condition, "Rain");
    }

    #[rstest]
    #[case("light rain", "Light Rain")]
    #[case("BROKEN CLOUDS", "Broken Clouds")]
    #[case("", "")]
    fn test_title_case(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(title_case(input), expected);
    }
}
