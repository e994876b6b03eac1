//! National Weather Service forecast client
//!
//! Two-step lookup: the points endpoint resolves coordinates to a grid, whose
//! properties carry the daily and hourly forecast URLs. NWS requires an
//! identifying User-Agent and serves GeoJSON.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::error::{Result, TravelError};
use crate::response::current_timestamp;
use crate::validate::validate_coordinates;

pub const PROVIDER_NAME: &str = "National Weather Service";

/// Weather boundary, mockable for tests
#[async_trait]
pub trait ForecastProvider: Send + Sync {
    /// Fetch the daily or hourly forecast for a coordinate pair.
    async fn forecast(&self, latitude: f64, longitude: f64, hourly: bool) -> Result<Value>;
}

/// HTTP client for api.weather.gov
pub struct NwsClient {
    client: reqwest::Client,
    base_url: String,
}

impl NwsClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TravelError::transport(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: "https://api.weather.gov".to_string(),
        })
    }

    async fn get_geojson(&self, url: &str) -> Result<Value> {
        debug!(%url, "NWS request");
        let response = self
            .client
            .get(url)
            .header(
                "User-Agent",
                concat!(
                    "TravelConciergeMCP/",
                    env!("CARGO_PKG_VERSION"),
                    " (travel-concierge, support@example.com)"
                ),
            )
            .header("Accept", "application/geo+json")
            .send()
            .await
            .map_err(|e| TravelError::transport(format!("Weather service request failed: {e}")))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(TravelError::not_found_with_suggestions(
                "No forecast available for these coordinates",
                "The National Weather Service covers United States territory only",
            ));
        }
        if !status.is_success() {
            return Err(TravelError::transport(format!(
                "Weather service request failed: HTTP {status}"
            )));
        }
        response
            .json()
            .await
            .map_err(|e| TravelError::transport(format!("Weather service request failed: {e}")))
    }
}

#[async_trait]
impl ForecastProvider for NwsClient {
    async fn forecast(&self, latitude: f64, longitude: f64, hourly: bool) -> Result<Value> {
        validate_coordinates(latitude, longitude)?;
        info!(latitude, longitude, hourly, "Fetching NWS forecast");

        // NWS rejects unrounded coordinates with a redirect; four decimals
        // is the precision its own site uses.
        let points_url = format!("{}/points/{latitude:.4},{longitude:.4}", self.base_url);
        let points = self.get_geojson(&points_url).await?;

        let forecast_field = if hourly { "forecastHourly" } else { "forecast" };
        let forecast_url = points
            .get("properties")
            .and_then(|p| p.get(forecast_field))
            .and_then(Value::as_str)
            .ok_or_else(|| {
                TravelError::provider(
                    "NWS",
                    format!("points response is missing the {forecast_field} URL"),
                )
            })?
            .to_string();

        let forecast = self.get_geojson(&forecast_url).await?;
        Ok(assemble_forecast(latitude, longitude, hourly, &points, &forecast))
    }
}

/// Build the tool payload from the two NWS responses.
fn assemble_forecast(
    latitude: f64,
    longitude: f64,
    hourly: bool,
    points: &Value,
    forecast: &Value,
) -> Value {
    let properties = forecast.get("properties");
    let periods = properties
        .and_then(|p| p.get("periods"))
        .cloned()
        .unwrap_or_else(|| json!([]));
    let grid = points.get("properties");

    json!({
        "coordinates": { "latitude": latitude, "longitude": longitude },
        "provider": PROVIDER_NAME,
        "forecast_type": if hourly { "hourly" } else { "daily" },
        "forecast_periods": periods,
        "forecast_metadata": {
            "grid_id": grid.and_then(|g| g.get("gridId")).cloned().unwrap_or(Value::Null),
            "time_zone": grid.and_then(|g| g.get("timeZone")).cloned().unwrap_or(Value::Null),
            "updated": properties.and_then(|p| p.get("updateTime")).cloned().unwrap_or(Value::Null),
            "elevation": properties.and_then(|p| p.get("elevation")).cloned().unwrap_or(Value::Null),
        },
        "search_timestamp": current_timestamp(),
    })
}
