//! Nominatim geocoding client with request pacing
//!
//! The public Nominatim instance requires at least one second between
//! consecutive requests. Forward and reverse lookups are paced separately;
//! the pacers live on the client, which is constructed once and shared, so
//! every caller goes through the same pair.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};
use tracing::{debug, info};

use crate::error::{Result, TravelError};
use crate::response::current_timestamp;
use crate::validate::validate_coordinates;

const NOT_FOUND_SUGGESTION: &str = "Try using a more specific address or well-known landmark name";

/// One geocoding candidate
#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    pub raw: Value,
}

/// Forward-geocode request options
#[derive(Debug, Clone)]
pub struct ForwardOptions {
    pub language: String,
    pub addressdetails: bool,
    pub country_codes: Option<String>,
    pub limit: usize,
}

impl Default for ForwardOptions {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            addressdetails: true,
            country_codes: None,
            limit: 1,
        }
    }
}

/// Geocoding boundary, mockable for tests
#[async_trait]
pub trait GeocodeBackend: Send + Sync {
    async fn forward(&self, query: &str, options: &ForwardOptions) -> Result<Vec<Place>>;
    async fn reverse(&self, latitude: f64, longitude: f64, language: &str)
    -> Result<Option<Place>>;
}

/// Serializes callers so consecutive requests stay a minimum interval apart.
struct RequestPacer {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RequestPacer {
    fn new(min_interval: Duration) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_interval,
        }
    }

    /// Wait until the interval since the previous call has elapsed. The lock
    /// is held across the sleep so concurrent callers queue up.
    async fn pace(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}

/// HTTP backend for nominatim.openstreetmap.org
pub struct NominatimBackend {
    client: reqwest::Client,
    base_url: String,
}

impl NominatimBackend {
    pub fn new(timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: super::http_client(timeout)?,
            base_url: "https://nominatim.openstreetmap.org".to_string(),
        })
    }

    fn parse_place(entry: &Value) -> Option<Place> {
        // Nominatim serializes coordinates as strings.
        let latitude = entry.get("lat")?.as_str()?.parse().ok()?;
        let longitude = entry.get("lon")?.as_str()?.parse().ok()?;
        let address = entry
            .get("display_name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        Some(Place {
            latitude,
            longitude,
            address,
            raw: entry.clone(),
        })
    }

    async fn get_json(&self, url: &str) -> Result<Value> {
        debug!(%url, "Nominatim request");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| TravelError::transport(format!("Geocoding service error: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            return Err(TravelError::transport(format!(
                "Geocoding service error: HTTP {status}"
            )));
        }
        response
            .json()
            .await
            .map_err(|e| TravelError::transport(format!("Geocoding service error: {e}")))
    }
}

#[async_trait]
impl GeocodeBackend for NominatimBackend {
    async fn forward(&self, query: &str, options: &ForwardOptions) -> Result<Vec<Place>> {
        let mut url = format!(
            "{}/search?q={}&format=jsonv2&limit={}&accept-language={}&addressdetails={}",
            self.base_url,
            urlencoding::encode(query),
            options.limit.max(1),
            urlencoding::encode(&options.language),
            u8::from(options.addressdetails),
        );
        if let Some(codes) = &options.country_codes {
            url.push_str("&countrycodes=");
            url.push_str(&urlencoding::encode(codes).into_owned());
        }

        let body = self.get_json(&url).await?;
        let places = body
            .as_array()
            .map(|entries| entries.iter().filter_map(Self::parse_place).collect())
            .unwrap_or_default();
        Ok(places)
    }

    async fn reverse(
        &self,
        latitude: f64,
        longitude: f64,
        language: &str,
    ) -> Result<Option<Place>> {
        let url = format!(
            "{}/reverse?lat={latitude}&lon={longitude}&format=jsonv2&accept-language={}",
            self.base_url,
            urlencoding::encode(language),
        );
        let body = self.get_json(&url).await?;
        if body.get("error").is_some() {
            return Ok(None);
        }
        Ok(Self::parse_place(&body))
    }
}

/// Paced geocoding façade used by the tool layer
pub struct GeocodingClient {
    backend: Arc<dyn GeocodeBackend>,
    forward_pacer: RequestPacer,
    reverse_pacer: RequestPacer,
}

impl GeocodingClient {
    pub fn new(backend: Arc<dyn GeocodeBackend>) -> Self {
        Self::with_min_interval(backend, Duration::from_secs(1))
    }

    pub fn with_min_interval(backend: Arc<dyn GeocodeBackend>, min_interval: Duration) -> Self {
        Self {
            backend,
            forward_pacer: RequestPacer::new(min_interval),
            reverse_pacer: RequestPacer::new(min_interval),
        }
    }

    /// Forward geocode. `exactly_one` picks between the single best match
    /// and an N-candidate listing; both shapes carry coordinates, address
    /// and the raw provider record.
    pub async fn geocode(
        &self,
        location: &str,
        exactly_one: bool,
        options: &ForwardOptions,
    ) -> Result<Value> {
        info!(location, exactly_one, "Geocoding location");
        self.forward_pacer.pace().await;

        let places = self.backend.forward(location, options).await?;
        let Some(first) = places.first() else {
            return Err(TravelError::not_found_with_suggestions(
                format!("Location '{location}' not found"),
                NOT_FOUND_SUGGESTION,
            ));
        };

        if exactly_one {
            return Ok(json!({
                "location": location,
                "coordinates": {
                    "latitude": first.latitude,
                    "longitude": first.longitude,
                },
                "address": first.address,
                "raw_data": first.raw,
                "search_timestamp": current_timestamp(),
            }));
        }

        let results: Vec<Value> = places
            .iter()
            .map(|place| {
                json!({
                    "coordinates": {
                        "latitude": place.latitude,
                        "longitude": place.longitude,
                    },
                    "address": place.address,
                    "raw_data": place.raw,
                })
            })
            .collect();
        Ok(json!({
            "location": location,
            "multiple_results": results,
            "search_timestamp": current_timestamp(),
        }))
    }

    /// Reverse geocode coordinates into the nearest address.
    pub async fn reverse_geocode(
        &self,
        latitude: f64,
        longitude: f64,
        language: &str,
    ) -> Result<Value> {
        validate_coordinates(latitude, longitude)?;
        info!(latitude, longitude, "Reverse geocoding");
        self.reverse_pacer.pace().await;

        let place = self
            .backend
            .reverse(latitude, longitude, language)
            .await?
            .ok_or_else(|| {
                TravelError::not_found(format!(
                    "No address found for coordinates ({latitude}, {longitude})"
                ))
            })?;

        Ok(json!({
            "coordinates": { "latitude": latitude, "longitude": longitude },
            "address": place.address,
            "raw_data": place.raw,
            "search_timestamp": current_timestamp(),
        }))
    }
}
