//! Configuration management for the travel concierge server
//!
//! All upstream credentials come from environment variables. Keys are
//! optional at startup; tools that depend on a missing key return a
//! configuration error body instead of failing the whole server.

use std::time::Duration;

/// Runtime configuration assembled from the environment
#[derive(Debug, Clone)]
pub struct ConciergeConfig {
    /// SerpAPI key (`SERPAPI_KEY`)
    pub serpapi_key: Option<String>,
    /// Amadeus self-service API key (`AMADEUS_API_KEY`)
    pub amadeus_api_key: Option<String>,
    /// Amadeus self-service API secret (`AMADEUS_API_SECRET`)
    pub amadeus_api_secret: Option<String>,
    /// ExchangeRate-API key (`EXCHANGE_RATE_API_KEY`)
    pub exchange_rate_api_key: Option<String>,
    /// Timeout applied to every upstream HTTP request
    pub http_timeout: Duration,
}

impl ConciergeConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Self {
        Self {
            serpapi_key: read_env("SERPAPI_KEY"),
            amadeus_api_key: read_env("AMADEUS_API_KEY"),
            amadeus_api_secret: read_env("AMADEUS_API_SECRET"),
            exchange_rate_api_key: read_env("EXCHANGE_RATE_API_KEY"),
            http_timeout: Duration::from_secs(10),
        }
    }
}

impl Default for ConciergeConfig {
    fn default() -> Self {
        Self {
            serpapi_key: None,
            amadeus_api_key: None,
            amadeus_api_secret: None,
            exchange_rate_api_key: None,
            http_timeout: Duration::from_secs(10),
        }
    }
}

/// Read an environment variable, treating empty values as unset.
fn read_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
