//! Configuration management for the `TripScout` library
//!
//! Handles loading configuration from files and environment variables and
//! validates all settings. A missing required credential is the one hard
//! failure this crate allows, and it happens here, at construction time.

use crate::TripScoutError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for the `TripScout` library
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripScoutConfig {
    /// Weather provider configuration
    pub weather: WeatherConfig,
    /// Flight data provider configuration
    pub flights: FlightsConfig,
    /// Visa scraping configuration
    pub visa: VisaConfig,
    /// LLM extraction configuration
    pub llm: LlmConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Weather provider (OpenWeatherMap) settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// OpenWeatherMap API key (required)
    #[serde(default)]
    pub api_key: String,
    /// Base URL for the forecast API
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_provider_timeout")]
    pub timeout_seconds: u32,
}

/// Flight data provider (AviationStack) settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightsConfig {
    /// AviationStack access key (required)
    #[serde(default)]
    pub access_key: String,
    /// Base URL for the flight data API
    #[serde(default = "default_flights_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_provider_timeout")]
    pub timeout_seconds: u32,
}

/// Visa scraping settings for both acquisition strategies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisaConfig {
    /// Base URL the static strategy builds country pages from
    #[serde(default = "default_visa_static_base_url")]
    pub static_base_url: String,
    /// URL of the form-driven lookup page the interactive strategy opens
    #[serde(default = "default_visa_form_url")]
    pub form_url: String,
    /// WebDriver endpoint for the interactive strategy
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,
    /// CSS selector for the passport-country dropdown
    #[serde(default = "default_passport_selector")]
    pub passport_selector: String,
    /// CSS selector for the destination-country dropdown
    #[serde(default = "default_destination_selector")]
    pub destination_selector: String,
    /// CSS selector for the form submit control
    #[serde(default = "default_submit_selector")]
    pub submit_selector: String,
    /// Settle delay after submitting, for client-side rendering
    #[serde(default = "default_settle_seconds")]
    pub settle_seconds: u32,
    /// Request timeout in seconds for the static strategy
    #[serde(default = "default_visa_timeout")]
    pub timeout_seconds: u32,
    /// Path of the write-once JSON visa cache; `None` disables caching
    #[serde(default)]
    pub cache_path: Option<String>,
}

/// LLM structured-extraction settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// API key for the OpenAI-compatible endpoint (required)
    #[serde(default)]
    pub api_key: String,
    /// Base URL of the OpenAI-compatible endpoint
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    /// Model name
    #[serde(default = "default_llm_model")]
    pub model: String,
    /// Request timeout in seconds
    #[serde(default = "default_llm_timeout")]
    pub timeout_seconds: u32,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_weather_base_url() -> String {
    "https://api.openweathermap.org/data/2.5".to_string()
}

fn default_flights_base_url() -> String {
    "https://api.aviationstack.com/v1".to_string()
}

fn default_visa_static_base_url() -> String {
    "https://visaindex.com/visa".to_string()
}

fn default_visa_form_url() -> String {
    "https://visaindex.com/visa-requirement-checker/".to_string()
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_passport_selector() -> String {
    "select#passport-country".to_string()
}

fn default_destination_selector() -> String {
    "select#destination-country".to_string()
}

fn default_submit_selector() -> String {
    "button[type='submit']".to_string()
}

fn default_settle_seconds() -> u32 {
    5
}

fn default_provider_timeout() -> u32 {
    15
}

fn default_visa_timeout() -> u32 {
    20
}

fn default_llm_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_llm_timeout() -> u32 {
    60
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for TripScoutConfig {
    fn default() -> Self {
        Self {
            weather: WeatherConfig {
                api_key: String::new(),
                base_url: default_weather_base_url(),
                timeout_seconds: default_provider_timeout(),
            },
            flights: FlightsConfig {
                access_key: String::new(),
                base_url: default_flights_base_url(),
                timeout_seconds: default_provider_timeout(),
            },
            visa: VisaConfig {
                static_base_url: default_visa_static_base_url(),
                form_url: default_visa_form_url(),
                webdriver_url: default_webdriver_url(),
                passport_selector: default_passport_selector(),
                destination_selector: default_destination_selector(),
                submit_selector: default_submit_selector(),
                settle_seconds: default_settle_seconds(),
                timeout_seconds: default_visa_timeout(),
                cache_path: None,
            },
            llm: LlmConfig {
                api_key: String::new(),
                base_url: default_llm_base_url(),
                model: default_llm_model(),
                timeout_seconds: default_llm_timeout(),
            },
            logging: LoggingConfig {
                level: default_log_level(),
                format: default_log_format(),
            },
        }
    }
}

impl TripScoutConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment overrides, e.g. TRIPSCOUT_WEATHER__API_KEY
        builder = builder.add_source(
            Environment::with_prefix("TRIPSCOUT")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let config: TripScoutConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tripscout").join("config.toml"))
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_credentials()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate required credentials; a missing key fails fast here instead
    /// of surfacing later as a confusing provider failure
    pub fn validate_credentials(&self) -> Result<()> {
        if self.weather.api_key.is_empty() {
            return Err(TripScoutError::config(
                "Weather API key is required. Set weather.api_key or TRIPSCOUT_WEATHER__API_KEY.",
            )
            .into());
        }

        if self.flights.access_key.is_empty() {
            return Err(TripScoutError::config(
                "Flight data access key is required. Set flights.access_key or TRIPSCOUT_FLIGHTS__ACCESS_KEY.",
            )
            .into());
        }

        if self.llm.api_key.is_empty() {
            return Err(TripScoutError::config(
                "LLM API key is required. Set llm.api_key or TRIPSCOUT_LLM__API_KEY.",
            )
            .into());
        }

        if self.llm.api_key.len() < 8 {
            return Err(TripScoutError::config(
                "LLM API key appears to be invalid (too short). Please check your API key.",
            )
            .into());
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        for (name, timeout) in [
            ("weather", self.weather.timeout_seconds),
            ("flights", self.flights.timeout_seconds),
            ("visa", self.visa.timeout_seconds),
            ("llm", self.llm.timeout_seconds),
        ] {
            if timeout == 0 || timeout > 300 {
                return Err(TripScoutError::config(format!(
                    "{name} timeout must be between 1 and 300 seconds"
                ))
                .into());
            }
        }

        if self.visa.settle_seconds > 60 {
            return Err(
                TripScoutError::config("Visa settle delay cannot exceed 60 seconds").into(),
            );
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(TripScoutError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(TripScoutError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (name, url) in [
            ("weather.base_url", &self.weather.base_url),
            ("flights.base_url", &self.flights.base_url),
            ("visa.static_base_url", &self.visa.static_base_url),
            ("visa.form_url", &self.visa.form_url),
            ("llm.base_url", &self.llm.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(TripScoutError::config(format!(
                    "{name} must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_keys() -> TripScoutConfig {
        let mut config = TripScoutConfig::default();
        config.weather.api_key = "weather_key_123".to_string();
        config.flights.access_key = "flights_key_123".to_string();
        config.llm.api_key = "llm_key_12345678".to_string();
        config
    }

    #[test]
    fn test_default_config() {
        let config = TripScoutConfig::default();
        assert_eq!(
            config.weather.base_url,
            "https://api.openweathermap.org/data/2.5"
        );
        assert_eq!(config.flights.base_url, "https://api.aviationstack.com/v1");
        assert_eq!(config.visa.settle_seconds, 5);
        assert_eq!(config.logging.level, "info");
        assert!(config.visa.cache_path.is_none());
    }

    #[test]
    fn test_missing_credentials_fail_fast() {
        let config = TripScoutConfig::default();
        let result = config.validate_credentials();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Weather API key"));
    }

    #[test]
    fn test_complete_credentials_validate() {
        let config = config_with_keys();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let mut config = config_with_keys();
        config.logging.level = "shouting".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_timeout_range_enforced() {
        let mut config = config_with_keys();
        config.flights.timeout_seconds = 500;
        let result = config.validate();
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("between 1 and 300")
        );
    }

    #[test]
    fn test_base_url_scheme_enforced() {
        let mut config = config_with_keys();
        config.visa.static_base_url = "ftp://visaindex.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_path_generation() {
        let path = TripScoutConfig::get_config_path();
        assert!(path.is_some());
        let path = path.unwrap();
        assert!(path.to_string_lossy().contains("tripscout"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }
}
