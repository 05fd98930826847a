//! Normalized weather forecast models

use serde::{Deserialize, Serialize};

/// One forecast entry per requested day, picked from the 3-hourly upstream
/// feed (the entry nearest local noon, or the first of the day).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    /// Calendar date, `YYYY-MM-DD`
    pub date: String,
    /// Timestamp of the selected upstream entry, `YYYY-MM-DD HH:MM:SS`
    pub datetime: String,
    /// Temperature in Celsius
    pub temperature: f64,
    /// Perceived temperature in Celsius
    pub feels_like: f64,
    /// Relative humidity percentage
    pub humidity: f64,
    /// Title-cased human-readable description, e.g. "Light Rain"
    pub description: String,
    /// Main condition group, e.g. "Rain"
    pub condition: String,
    /// Wind speed in m/s; `None` when the upstream omitted it
    pub wind_speed: Option<f64>,
    /// Cloud cover percentage; `None` when the upstream omitted it
    pub cloud_pct: Option<u8>,
}

/// Weather forecast for one city
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherForecast {
    /// City the forecast was requested for, as given by the caller
    pub city: String,
    /// Country code reported by the provider
    pub country: Option<String>,
    /// UTC offset of the city's timezone in seconds
    pub timezone_offset_s: Option<i32>,
    /// One entry per day, in chronological order
    pub forecasts: Vec<DailyForecast>,
    pub total_forecasts: usize,
}
