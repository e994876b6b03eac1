//! SerpAPI consumer search client
//!
//! One endpoint serves every vertical; the `engine` query parameter selects
//! flights, hotels, events or finance. The raw JSON payload is returned
//! unshaped; the tool layer does the per-vertical processing.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::error::{Result, TravelError};
use crate::response::sanitize_url_for_logging;

/// Search engines exposed by the provider.
pub const ENGINE_GOOGLE_FLIGHTS: &str = "google_flights";
pub const ENGINE_GOOGLE_HOTELS: &str = "google_hotels";
pub const ENGINE_GOOGLE_EVENTS: &str = "google_events";

/// Consumer search boundary, mockable for tests
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Run one search against the given engine with pre-built parameters.
    async fn search(&self, engine: &str, params: &Map<String, Value>) -> Result<Value>;
}

/// HTTP client for serpapi.com
pub struct SerpApiClient {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl SerpApiClient {
    pub fn new(api_key: Option<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: super::http_client(timeout)?,
            api_key,
            base_url: "https://serpapi.com/search".to_string(),
        })
    }

    #[cfg(test)]
    fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }
}

/// Render a JSON value as a query-string value.
fn query_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[async_trait]
impl SearchProvider for SerpApiClient {
    async fn search(&self, engine: &str, params: &Map<String, Value>) -> Result<Value> {
        // Key check happens before any I/O so a misconfigured server fails fast.
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| TravelError::config("SERPAPI_KEY environment variable not set"))?;

        let mut url = format!(
            "{}?engine={}&api_key={}",
            self.base_url,
            urlencoding::encode(engine),
            urlencoding::encode(api_key)
        );
        for (name, value) in params {
            url.push('&');
            url.push_str(&urlencoding::encode(name));
            url.push('=');
            url.push_str(&urlencoding::encode(&query_value(value)).into_owned());
        }

        info!(engine, "Searching SerpAPI");
        debug!(url = %sanitize_url_for_logging(&url), "SerpAPI request");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| TravelError::transport(format!("SerpAPI request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TravelError::transport(format!(
                "SerpAPI request failed: HTTP {status}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| TravelError::transport(format!("SerpAPI request failed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_missing_key_short_circuits_without_network() {
        // An unroutable base URL proves no request is attempted.
        let client = SerpApiClient::new(None, Duration::from_secs(1))
            .unwrap()
            .with_base_url("http://127.0.0.1:1/search".to_string());
        let err = client
            .search(ENGINE_GOOGLE_FLIGHTS, &Map::new())
            .await
            .unwrap_err();
        assert!(matches!(err, TravelError::Config { .. }));
        assert!(err.to_string().contains("SERPAPI_KEY"));
    }

    #[test]
    fn test_query_values_encode_non_strings() {
        assert_eq!(query_value(&json!("new york")), "new york");
        assert_eq!(query_value(&json!(3)), "3");
        assert_eq!(query_value(&json!(true)), "true");
    }
}
