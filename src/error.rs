//! Error types and handling for the `TripScout` library

use thiserror::Error;

/// Main error type for the `TripScout` library
///
/// These errors are reserved for programming and configuration faults that
/// should fail fast (missing credentials, unusable cache file, broken LLM
/// reply). Upstream provider problems never surface here; they are folded
/// into [`crate::provider::ProviderResult`] values instead.
#[derive(Error, Debug)]
pub enum TripScoutError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// LLM structured-extraction errors
    #[error("Extraction error: {message}")]
    Extraction { message: String },

    /// Visa cache file errors
    #[error("Cache error: {message}")]
    Cache { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// General application errors
    #[error("Application error: {message}")]
    General { message: String },
}

impl TripScoutError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new extraction error
    pub fn extraction<S: Into<String>>(message: S) -> Self {
        Self::Extraction {
            message: message.into(),
        }
    }

    /// Create a new cache error
    pub fn cache<S: Into<String>>(message: S) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    /// Create a new general error
    pub fn general<S: Into<String>>(message: S) -> Self {
        Self::General {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            TripScoutError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
            TripScoutError::Extraction { .. } => {
                "Could not extract structured data from the page text.".to_string()
            }
            TripScoutError::Cache { .. } => {
                "Visa cache operation failed. You may need to delete the cache file.".to_string()
            }
            TripScoutError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
            TripScoutError::General { message } => message.clone(),
        }
    }
}
