//! Amadeus GDS client
//!
//! Two layers: `AmadeusGateway` is the raw REST boundary (OAuth2 token plus
//! one GET per endpoint), `AmadeusClient` owns business-rule validation and
//! response normalization. Validation always runs before the gateway is
//! touched, so a rejected request performs zero network calls.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::accessibility::{extract_amadeus_hotel_accessibility, extract_flight_accessibility};
use crate::error::{Result, TravelError};
use crate::params::build_optional_params;
use crate::response::with_search_metadata;

pub const PROVIDER_NAME: &str = "Amadeus GDS";

const CAPABILITY_NOTE: &str = "This API might require a newer SDK version or special access";

/// Raw REST boundary, mockable for tests
#[async_trait]
pub trait AmadeusGateway: Send + Sync {
    async fn flight_offers(&self, params: &Map<String, Value>) -> Result<Value>;
    async fn hotels_by_city(&self, params: &Map<String, Value>) -> Result<Value>;
    async fn hotels_by_geocode(&self, params: &Map<String, Value>) -> Result<Value>;
    async fn hotel_offers(&self, params: &Map<String, Value>) -> Result<Value>;
    async fn activities(&self, params: &Map<String, Value>) -> Result<Value>;
    async fn activity_by_id(&self, activity_id: &str) -> Result<Value>;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

/// HTTP gateway against the Amadeus self-service REST API
pub struct HttpAmadeusGateway {
    client: reqwest::Client,
    credentials: Option<(String, String)>,
    base_url: String,
    token: Mutex<Option<CachedToken>>,
}

impl HttpAmadeusGateway {
    pub fn new(
        api_key: Option<String>,
        api_secret: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            client: super::http_client(timeout)?,
            credentials: api_key.zip(api_secret),
            base_url: "https://test.api.amadeus.com".to_string(),
            token: Mutex::new(None),
        })
    }

    /// Fetch or reuse the OAuth2 client-credentials token.
    async fn bearer_token(&self) -> Result<String> {
        let Some((api_key, api_secret)) = &self.credentials else {
            return Err(TravelError::config(
                "AMADEUS_API_KEY and AMADEUS_API_SECRET environment variables are required",
            ));
        };

        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.expires_at {
                return Ok(token.access_token.clone());
            }
        }

        debug!("Requesting new Amadeus access token");
        let response = self
            .client
            .post(format!("{}/v1/security/oauth2/token", self.base_url))
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", api_key.as_str()),
                ("client_secret", api_secret.as_str()),
            ])
            .send()
            .await
            .map_err(|e| TravelError::transport(format!("Amadeus token request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "Amadeus token request rejected");
            return Err(TravelError::provider(
                "Amadeus",
                format!("authentication failed with HTTP {status}"),
            ));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| TravelError::transport(format!("Amadeus token request failed: {e}")))?;

        // Renew one minute early so in-flight requests never race expiry.
        let expires_at =
            Instant::now() + Duration::from_secs(token.expires_in.saturating_sub(60).max(1));
        let access_token = token.access_token.clone();
        *cached = Some(CachedToken {
            access_token: token.access_token,
            expires_at,
        });
        Ok(access_token)
    }

    /// One authenticated GET. `capability_gated` marks endpoints absent from
    /// some API plans, where a 404 means "not enabled" rather than "no data".
    async fn get(
        &self,
        path: &str,
        params: &Map<String, Value>,
        capability_gated: bool,
    ) -> Result<Value> {
        let token = self.bearer_token().await?;
        let query: Vec<(String, String)> = params
            .iter()
            .map(|(name, value)| {
                let rendered = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (name.clone(), rendered)
            })
            .collect();

        let response = self
            .client
            .get(format!("{}{path}", self.base_url))
            .bearer_auth(token)
            .query(&query)
            .send()
            .await
            .map_err(|e| TravelError::transport(format!("Amadeus request failed: {e}")))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND && capability_gated {
            return Err(TravelError::capability_unavailable(
                "Tours and Activities API not available for this account",
                CAPABILITY_NOTE,
            ));
        }
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(TravelError::provider(
                "Amadeus",
                format!("HTTP {status}: {detail}"),
            ));
        }

        response
            .json()
            .await
            .map_err(|e| TravelError::transport(format!("Amadeus request failed: {e}")))
    }
}

#[async_trait]
impl AmadeusGateway for HttpAmadeusGateway {
    async fn flight_offers(&self, params: &Map<String, Value>) -> Result<Value> {
        self.get("/v2/shopping/flight-offers", params, false).await
    }

    async fn hotels_by_city(&self, params: &Map<String, Value>) -> Result<Value> {
        self.get("/v1/reference-data/locations/hotels/by-city", params, false)
            .await
    }

    async fn hotels_by_geocode(&self, params: &Map<String, Value>) -> Result<Value> {
        self.get(
            "/v1/reference-data/locations/hotels/by-geocode",
            params,
            false,
        )
        .await
    }

    async fn hotel_offers(&self, params: &Map<String, Value>) -> Result<Value> {
        self.get("/v3/shopping/hotel-offers", params, false).await
    }

    async fn activities(&self, params: &Map<String, Value>) -> Result<Value> {
        self.get("/v1/shopping/activities", params, true).await
    }

    async fn activity_by_id(&self, activity_id: &str) -> Result<Value> {
        let path = format!(
            "/v1/shopping/activities/{}",
            urlencoding::encode(activity_id)
        );
        self.get(&path, &Map::new(), true).await
    }
}

/// Flight offers search request
#[derive(Debug, Clone)]
pub struct FlightOffersQuery {
    pub origin_location_code: String,
    pub destination_location_code: String,
    pub departure_date: String,
    pub adults: i64,
    pub return_date: Option<String>,
    pub children: Option<i64>,
    pub infants: Option<i64>,
    pub travel_class: Option<String>,
    pub included_airline_codes: Option<String>,
    pub excluded_airline_codes: Option<String>,
    pub non_stop: Option<bool>,
    pub currency_code: Option<String>,
    pub max_price: Option<i64>,
    pub max: i64,
}

/// Business-rule and normalization layer over the raw gateway
#[derive(Clone)]
pub struct AmadeusClient {
    gateway: Arc<dyn AmadeusGateway>,
}

impl AmadeusClient {
    pub fn new(gateway: Arc<dyn AmadeusGateway>) -> Self {
        Self { gateway }
    }

    /// Search flight offers, with passenger rules enforced up front.
    pub async fn search_flight_offers(&self, query: &FlightOffersQuery) -> Result<Value> {
        validate_passenger_counts(query.adults, query.children, query.infants)?;

        let mut required = Map::new();
        required.insert("originLocationCode".into(), json!(query.origin_location_code));
        required.insert(
            "destinationLocationCode".into(),
            json!(query.destination_location_code),
        );
        required.insert("departureDate".into(), json!(query.departure_date));
        required.insert("adults".into(), json!(query.adults));

        let mut optional = Map::new();
        optional.insert("returnDate".into(), json!(query.return_date));
        optional.insert("children".into(), json!(query.children));
        optional.insert("infants".into(), json!(query.infants));
        optional.insert("travelClass".into(), json!(query.travel_class));
        optional.insert(
            "includedAirlineCodes".into(),
            json!(query.included_airline_codes),
        );
        optional.insert(
            "excludedAirlineCodes".into(),
            json!(query.excluded_airline_codes),
        );
        optional.insert("nonStop".into(), json!(query.non_stop));
        optional.insert("currencyCode".into(), json!(query.currency_code));
        optional.insert("maxPrice".into(), json!(query.max_price));
        optional.insert("max".into(), json!(query.max));

        let params = build_optional_params(
            &required,
            &optional,
            &["children", "infants", "nonStop", "maxPrice", "max"],
        );

        info!(
            origin = %query.origin_location_code,
            destination = %query.destination_location_code,
            "Searching Amadeus flight offers"
        );

        let result = self.gateway.flight_offers(&params).await?;
        Ok(process_flight_offers(result, query.adults))
    }

    pub async fn search_hotels_by_city(&self, params: &Map<String, Value>) -> Result<Value> {
        let result = self.gateway.hotels_by_city(params).await?;
        Ok(with_search_metadata(&result, PROVIDER_NAME))
    }

    pub async fn search_hotels_by_geocode(&self, params: &Map<String, Value>) -> Result<Value> {
        let result = self.gateway.hotels_by_geocode(params).await?;
        Ok(with_search_metadata(&result, PROVIDER_NAME))
    }

    /// Hotel offers require a city code or explicit hotel ids.
    pub async fn search_hotel_offers(&self, params: &Map<String, Value>) -> Result<Value> {
        if !params.contains_key("cityCode") && !params.contains_key("hotelIds") {
            return Err(TravelError::validation(
                "Either cityCode or hotelIds must be provided",
            ));
        }
        let result = self.gateway.hotel_offers(params).await?;
        Ok(with_search_metadata(
            &annotate_hotel_offers(result),
            PROVIDER_NAME,
        ))
    }

    pub async fn search_activities(&self, params: &Map<String, Value>) -> Result<Value> {
        let result = self.gateway.activities(params).await?;
        Ok(with_search_metadata(&result, PROVIDER_NAME))
    }

    pub async fn activity_details(&self, activity_id: &str) -> Result<Value> {
        let result = self.gateway.activity_by_id(activity_id).await?;
        Ok(with_search_metadata(&result, PROVIDER_NAME))
    }
}

/// Passenger rules enforced before any upstream call.
fn validate_passenger_counts(adults: i64, children: Option<i64>, infants: Option<i64>) -> Result<()> {
    if !(1..=9).contains(&adults) {
        return Err(TravelError::validation("Adults must be between 1 and 9"));
    }
    let children = children.unwrap_or(0);
    let infants = infants.unwrap_or(0);
    if infants > 0 && adults + children > 9 {
        return Err(TravelError::validation(
            "Total number of seated travelers (adults + children) cannot exceed 9",
        ));
    }
    if infants > adults {
        return Err(TravelError::validation(
            "Number of infants cannot exceed number of adults",
        ));
    }
    Ok(())
}

/// Attach emissions summaries and accessibility records to each offer, plus
/// the top-level provider metadata.
fn process_flight_offers(result: Value, adults: i64) -> Value {
    let mut result = match result {
        Value::Object(map) => map,
        other => {
            let mut map = Map::new();
            map.insert("data".into(), other);
            map
        }
    };

    let mut emissions_included = false;
    if let Some(Value::Array(offers)) = result.get_mut("data") {
        for (index, offer) in offers.iter_mut().enumerate() {
            if let Some(emissions) = offer.get("co2Emissions").cloned() {
                if index == 0 {
                    emissions_included = true;
                }
                let summary = summarize_emissions(&emissions, adults);
                if let Some(map) = offer.as_object_mut() {
                    map.insert("co2_emissions_summary".into(), summary);
                }
            }
            let accessibility = extract_flight_accessibility(offer);
            if let Some(map) = offer.as_object_mut() {
                // Serializing a plain record cannot fail.
                map.insert(
                    "accessibility".into(),
                    serde_json::to_value(accessibility).unwrap_or(Value::Null),
                );
            }
        }
    }

    result.insert("provider".into(), json!(PROVIDER_NAME));
    result.insert("emissions_included".into(), json!(emissions_included));
    result.insert("accessibility_included".into(), json!(true));
    result.insert(
        "search_timestamp".into(),
        json!(crate::response::current_timestamp()),
    );
    Value::Object(result)
}

/// Annotate each hotel-offers entry with a facility-keyword accessibility
/// record. Facilities sit under the entry's `hotel` object when present.
fn annotate_hotel_offers(mut result: Value) -> Value {
    if let Some(Value::Array(entries)) = result.get_mut("data") {
        for entry in entries {
            let source = entry.get("hotel").filter(|h| h.is_object()).unwrap_or(entry);
            let accessibility = extract_amadeus_hotel_accessibility(source);
            if let Some(map) = entry.as_object_mut() {
                map.insert(
                    "accessibility".into(),
                    serde_json::to_value(accessibility).unwrap_or(Value::Null),
                );
            }
        }
    }
    result
}

/// Fold the per-cabin emissions array into a summary block.
fn summarize_emissions(emissions: &Value, adults: i64) -> Value {
    let divisor = adults.max(1) as f64;
    let entries = emissions.as_array().cloned().unwrap_or_default();
    let by_cabin: Vec<Value> = entries
        .iter()
        .map(|entry| {
            let weight = entry.get("weight").and_then(Value::as_f64).unwrap_or(0.0);
            json!({
                "cabin": entry.get("cabin").and_then(Value::as_str).unwrap_or("UNKNOWN"),
                "weight_kg": entry.get("weight"),
                "per_passenger_kg": (weight / divisor * 100.0).round() / 100.0,
            })
        })
        .collect();
    let total: f64 = entries
        .iter()
        .map(|entry| entry.get("weight").and_then(Value::as_f64).unwrap_or(0.0))
        .sum();
    json!({
        "emissions_by_cabin": by_cabin,
        "total_weight_kg": total,
        "unit": "kilograms",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Gateway fake that counts calls and returns a canned payload.
    struct CountingGateway {
        calls: AtomicUsize,
        payload: Value,
    }

    impl CountingGateway {
        fn new(payload: Value) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                payload,
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn bump(&self) -> Result<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.payload.clone())
        }
    }

    #[async_trait]
    impl AmadeusGateway for CountingGateway {
        async fn flight_offers(&self, _: &Map<String, Value>) -> Result<Value> {
            self.bump()
        }
        async fn hotels_by_city(&self, _: &Map<String, Value>) -> Result<Value> {
            self.bump()
        }
        async fn hotels_by_geocode(&self, _: &Map<String, Value>) -> Result<Value> {
            self.bump()
        }
        async fn hotel_offers(&self, _: &Map<String, Value>) -> Result<Value> {
            self.bump()
        }
        async fn activities(&self, _: &Map<String, Value>) -> Result<Value> {
            self.bump()
        }
        async fn activity_by_id(&self, _: &str) -> Result<Value> {
            self.bump()
        }
    }

    fn flight_query(adults: i64) -> FlightOffersQuery {
        FlightOffersQuery {
            origin_location_code: "JFK".into(),
            destination_location_code: "CDG".into(),
            departure_date: "2026-09-15".into(),
            adults,
            return_date: None,
            children: None,
            infants: None,
            travel_class: None,
            included_airline_codes: None,
            excluded_airline_codes: None,
            non_stop: None,
            currency_code: None,
            max_price: None,
            max: 250,
        }
    }

    #[rstest]
    #[case(1, true)]
    #[case(9, true)]
    #[case(0, false)]
    #[case(10, false)]
    fn test_adult_count_boundaries(#[case] adults: i64, #[case] ok: bool) {
        assert_eq!(validate_passenger_counts(adults, None, None).is_ok(), ok);
    }

    #[test]
    fn test_infants_cannot_exceed_adults() {
        assert!(validate_passenger_counts(2, None, Some(3)).is_err());
        assert!(validate_passenger_counts(2, None, Some(2)).is_ok());
    }

    #[test]
    fn test_seated_traveler_cap_applies_when_infants_present() {
        assert!(validate_passenger_counts(5, Some(5), Some(1)).is_err());
        // Without infants the upstream API enforces its own seat limit.
        assert!(validate_passenger_counts(5, Some(5), None).is_ok());
    }

    #[tokio::test]
    async fn test_rejected_search_makes_no_gateway_calls() {
        let gateway = Arc::new(CountingGateway::new(json!({ "data": [] })));
        let client = AmadeusClient::new(gateway.clone());
        let err = client
            .search_flight_offers(&flight_query(10))
            .await
            .unwrap_err();
        assert!(matches!(err, TravelError::Validation { .. }));
        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn test_valid_search_calls_gateway_once_and_normalizes() {
        let gateway = Arc::new(CountingGateway::new(json!({
            "data": [{
                "id": "1",
                "co2Emissions": [
                    { "cabin": "ECONOMY", "weight": 90 },
                    { "cabin": "BUSINESS", "weight": 150 },
                ],
            }],
        })));
        let client = AmadeusClient::new(gateway.clone());
        let result = client.search_flight_offers(&flight_query(2)).await.unwrap();
        assert_eq!(gateway.call_count(), 1);
        assert_eq!(result["provider"], PROVIDER_NAME);
        assert_eq!(result["emissions_included"], json!(true));
        assert_eq!(result["accessibility_included"], json!(true));
        let summary = &result["data"][0]["co2_emissions_summary"];
        assert_eq!(summary["total_weight_kg"], json!(240.0));
        assert_eq!(summary["unit"], "kilograms");
        assert_eq!(summary["emissions_by_cabin"][0]["per_passenger_kg"], json!(45.0));
        assert!(result["data"][0]["accessibility"]["notes"].is_string());
    }

    #[tokio::test]
    async fn test_offers_without_emissions_still_get_accessibility() {
        let gateway = Arc::new(CountingGateway::new(json!({ "data": [{ "id": "7" }] })));
        let client = AmadeusClient::new(gateway);
        let result = client.search_flight_offers(&flight_query(1)).await.unwrap();
        assert_eq!(result["emissions_included"], json!(false));
        assert_eq!(
            result["data"][0]["accessibility"]["wheelchair_available"],
            json!(false)
        );
    }

    #[tokio::test]
    async fn test_hotel_offers_require_city_or_hotel_ids() {
        let gateway = Arc::new(CountingGateway::new(json!({ "data": [] })));
        let client = AmadeusClient::new(gateway.clone());
        let mut params = Map::new();
        params.insert("adults".into(), json!(1));
        let err = client.search_hotel_offers(&params).await.unwrap_err();
        assert!(err.to_string().contains("cityCode or hotelIds"));
        assert_eq!(gateway.call_count(), 0);

        params.insert("cityCode".into(), json!("PAR"));
        let result = client.search_hotel_offers(&params).await.unwrap();
        assert_eq!(result["provider"], PROVIDER_NAME);
        assert_eq!(gateway.call_count(), 1);
    }

    #[tokio::test]
    async fn test_hotel_offers_are_annotated_from_facilities() {
        let gateway = Arc::new(CountingGateway::new(json!({
            "data": [{
                "hotel": {
                    "name": "Grand Hotel",
                    "facilities": [
                        { "description": "Wheelchair accessible entrance" },
                        { "description": "Swimming pool" },
                    ],
                },
                "offers": [],
            }],
        })));
        let client = AmadeusClient::new(gateway);
        let mut params = Map::new();
        params.insert("cityCode".into(), json!("PAR"));
        let result = client.search_hotel_offers(&params).await.unwrap();
        let accessibility = &result["data"][0]["accessibility"];
        assert_eq!(accessibility["wheelchair_accessible"], json!(true));
        assert!(
            accessibility["facility_list"]
                .as_array()
                .is_some_and(|f| f.len() == 2)
        );
    }
}
