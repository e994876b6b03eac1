//! Upstream provider clients
//!
//! Every provider sits behind a trait so the tool layer can be exercised
//! against in-memory fakes. HTTP implementations share the same shape: one
//! `reqwest::Client` with a 10-second timeout, one request per call, no
//! retries.

pub mod amadeus;
pub mod exchange_rate;
pub mod geocoding;
pub mod serpapi;
pub mod weather;

pub use amadeus::{AmadeusClient, AmadeusGateway, HttpAmadeusGateway};
pub use exchange_rate::{ExchangeRateApi, RateSource, convert_currency};
pub use geocoding::{GeocodeBackend, GeocodingClient, NominatimBackend, Place};
pub use serpapi::{SearchProvider, SerpApiClient};
pub use weather::{ForecastProvider, NwsClient};

use std::time::Duration;

use crate::error::{Result, TravelError};

/// Build the shared HTTP client used by every provider implementation.
pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("TravelConciergeMCP/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| TravelError::transport(format!("Failed to create HTTP client: {e}")))
}
