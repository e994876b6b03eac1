//! Error types and handling for the travel concierge server

use serde_json::{Value, json};
use thiserror::Error;

/// Main error type for the travel concierge
#[derive(Error, Debug)]
pub enum TravelError {
    /// Configuration-related errors (missing API keys etc.)
    #[error("{message}")]
    Config { message: String },

    /// Input validation errors, raised before any upstream call
    #[error("{message}")]
    Validation { message: String },

    /// Transport-level errors (network, timeout). Messages are generic and
    /// never contain credentials or full request URLs.
    #[error("{message}")]
    Transport { message: String },

    /// Errors reported by an upstream provider
    #[error("{provider} API error: {message}")]
    Provider { provider: String, message: String },

    /// Lookup produced no result
    #[error("{message}")]
    NotFound {
        message: String,
        suggestions: Option<String>,
    },

    /// Upstream endpoint exists in the product catalog but is not reachable
    /// with the current credentials or API version
    #[error("{message}")]
    CapabilityUnavailable { message: String, note: String },
}

impl TravelError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new transport error
    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a new provider error
    pub fn provider<P: Into<String>, S: Into<String>>(provider: P, message: S) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a not-found error without suggestions
    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound {
            message: message.into(),
            suggestions: None,
        }
    }

    /// Create a not-found error with a hint for the caller
    pub fn not_found_with_suggestions<S: Into<String>, H: Into<String>>(
        message: S,
        suggestions: H,
    ) -> Self {
        Self::NotFound {
            message: message.into(),
            suggestions: Some(suggestions.into()),
        }
    }

    /// Create a capability-unavailable error with an explanatory note
    pub fn capability_unavailable<S: Into<String>, N: Into<String>>(message: S, note: N) -> Self {
        Self::CapabilityUnavailable {
            message: message.into(),
            note: note.into(),
        }
    }

    /// Render the uniform error body returned by every tool.
    ///
    /// Clients always receive `{"error": ...}` plus optional `suggestions`
    /// or `note` fields; no error ever propagates past the tool boundary.
    #[must_use]
    pub fn to_body(&self) -> Value {
        match self {
            TravelError::NotFound {
                message,
                suggestions: Some(hint),
            } => json!({ "error": message, "suggestions": hint }),
            TravelError::CapabilityUnavailable { message, note } => {
                json!({ "error": message, "note": note })
            }
            other => json!({ "error": other.to_string() }),
        }
    }
}

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, TravelError>;
