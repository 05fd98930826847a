//! The per-provider result contract
//!
//! Every adapter in this crate returns a [`ProviderResult`]: either the
//! normalized data, or a typed failure carrying the reason and the request
//! context. No adapter lets a fault escape as an `Err` or a panic, so the
//! orchestration layer can always render "data unavailable, reason X" for one
//! facet while the others proceed.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Enumerated failure kinds, so callers can branch on the failure class
/// instead of parsing a reason string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Network failure, timeout or non-success status from a provider
    UpstreamUnavailable,
    /// A 2xx response whose body did not match the expected schema
    MalformedResponse,
    /// A place name could not be mapped to an airport or country code
    UnresolvableEntity,
    /// The interactive visa strategy could not drive the upstream page
    BrowserAutomationFault,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::UpstreamUnavailable => "upstream unavailable",
            FailureKind::MalformedResponse => "malformed response",
            FailureKind::UnresolvableEntity => "unresolvable entity",
            FailureKind::BrowserAutomationFault => "browser automation fault",
        };
        write!(f, "{name}")
    }
}

/// A provider failure: what went wrong, a human-readable reason, and the
/// identifying request parameters so the consumer keeps its context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderError {
    pub kind: FailureKind,
    pub reason: String,
    /// Identifying request parameters, e.g. `"Tokyo"` or `"DEL -> LHR"`
    pub context: String,
}

impl ProviderError {
    pub fn new<R: Into<String>, C: Into<String>>(kind: FailureKind, reason: R, context: C) -> Self {
        Self {
            kind,
            reason: reason.into(),
            context: context.into(),
        }
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} for {}: {}", self.kind, self.context, self.reason)
    }
}

/// Uniform result shape returned by every provider adapter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProviderResult<T> {
    Success {
        data: T,
    },
    Failure {
        error: ProviderError,
        /// Whatever was salvaged before the failure, if anything
        partial: Option<T>,
    },
}

impl<T> ProviderResult<T> {
    pub fn success(data: T) -> Self {
        Self::Success { data }
    }

    pub fn failure(error: ProviderError) -> Self {
        Self::Failure {
            error,
            partial: None,
        }
    }

    pub fn failure_with_partial(error: ProviderError, partial: T) -> Self {
        Self::Failure {
            error,
            partial: Some(partial),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The normalized data, if the call succeeded
    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Success { data } => Some(data),
            Self::Failure { .. } => None,
        }
    }

    /// The failure, if the call did not succeed
    pub fn error(&self) -> Option<&ProviderError> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { error, .. } => Some(error),
        }
    }
}
