//! MCP tool façade
//!
//! Every tool follows the same convention: the payload is a JSON object
//! serialized into text content, and failures return an error result whose
//! body is the uniform `{"error": ...}` shape. Upstream providers are held
//! as trait objects so the whole surface can be tested against fakes.

use std::sync::Arc;

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{
        CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
    },
    schemars, tool, tool_handler, tool_router,
};
use serde_json::{Map, Value, json};
use tracing::warn;

use crate::accessibility::extract_hotel_accessibility;
use crate::clients::amadeus::FlightOffersQuery;
use crate::clients::geocoding::ForwardOptions;
use crate::clients::serpapi::{ENGINE_GOOGLE_EVENTS, ENGINE_GOOGLE_FLIGHTS, ENGINE_GOOGLE_HOTELS};
use crate::clients::{
    AmadeusClient, ForecastProvider, GeocodingClient, RateSource, SearchProvider, convert_currency,
};
use crate::error::TravelError;
use crate::geo::distance_between;
use crate::params::build_optional_params;
use crate::response::current_timestamp;
use crate::validate::validate_date;

const TRAVEL_CLASS_LABELS: [&str; 4] = ["Economy", "Premium economy", "Business", "First"];

const SSR_ADVISORY: &str = "For accessibility requirements (wheelchair, deaf, blind, stretcher), \
    contact airlines directly with IATA Special Service Request (SSR) codes: WCHR (wheelchair), \
    WCHS (wheelchair with stowage), STCR (stretcher), DEAF, BLND, PRMK (mobility disability)";

// ---------- Tool parameter types ----------

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct FlightSearchParams {
    /// Departure airport code or location (e.g. "JFK", "CDG")
    pub departure_id: String,
    /// Arrival airport code or location
    pub arrival_id: String,
    /// Outbound date (YYYY-MM-DD)
    pub outbound_date: String,
    /// Return date (YYYY-MM-DD), round trips only
    pub return_date: Option<String>,
    /// 1 = round trip, 2 = one way, 3 = multi-city (default: 1)
    pub trip_type: Option<i64>,
    /// Number of adults (default: 1)
    pub adults: Option<i64>,
    /// Number of children (default: 0)
    pub children: Option<i64>,
    /// Number of infants in seat (default: 0)
    pub infants_in_seat: Option<i64>,
    /// Number of infants on lap (default: 0)
    pub infants_on_lap: Option<i64>,
    /// 1 = Economy, 2 = Premium economy, 3 = Business, 4 = First (default: 1)
    pub travel_class: Option<i64>,
    /// Currency code for prices (default: USD)
    pub currency: Option<String>,
    /// Country code for results (default: us)
    pub country: Option<String>,
    /// Language code (default: en)
    pub language: Option<String>,
    /// Maximum flights to return per group (default: 10)
    pub max_results: Option<usize>,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct AmadeusFlightParams {
    /// Origin airport IATA code (e.g. "JFK")
    pub origin_location_code: String,
    /// Destination airport IATA code
    pub destination_location_code: String,
    /// Departure date (YYYY-MM-DD)
    pub departure_date: String,
    /// Number of adults, 1-9
    pub adults: i64,
    /// Return date (YYYY-MM-DD) for round trips
    pub return_date: Option<String>,
    /// Number of children
    pub children: Option<i64>,
    /// Number of infants; cannot exceed adults
    pub infants: Option<i64>,
    /// Cabin class (ECONOMY, PREMIUM_ECONOMY, BUSINESS, FIRST)
    pub travel_class: Option<String>,
    /// Comma-separated airline codes to include
    pub included_airline_codes: Option<String>,
    /// Comma-separated airline codes to exclude
    pub excluded_airline_codes: Option<String>,
    /// Direct flights only
    pub non_stop: Option<bool>,
    /// Currency code for prices
    pub currency_code: Option<String>,
    /// Maximum price per traveler
    pub max_price: Option<i64>,
    /// Maximum offers to return (default: 250)
    pub max: Option<i64>,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct HotelSearchParams {
    /// Destination (city, region or landmark)
    pub location: String,
    /// Check-in date (YYYY-MM-DD)
    pub check_in_date: String,
    /// Check-out date (YYYY-MM-DD)
    pub check_out_date: String,
    /// Number of adults (default: 2)
    pub adults: Option<i64>,
    /// Number of children (default: 0)
    pub children: Option<i64>,
    /// Ages of the children
    pub children_ages: Option<Vec<i64>>,
    /// Currency code for prices (default: USD)
    pub currency: Option<String>,
    /// Country code for results (default: us)
    pub country: Option<String>,
    /// Language code (default: en)
    pub language: Option<String>,
    /// Sort order id
    pub sort_by: Option<i64>,
    /// Star ratings to include (2-5)
    pub hotel_class: Option<Vec<i64>>,
    /// Amenity filter ids
    pub amenities: Option<Vec<i64>>,
    /// Property type filter ids
    pub property_types: Option<Vec<i64>>,
    /// Hotel brand filter ids
    pub brands: Option<Vec<i64>>,
    /// Only stays with free cancellation
    pub free_cancellation: Option<bool>,
    /// Only stays with special offers
    pub special_offers: Option<bool>,
    /// Search vacation rentals instead of hotels
    pub vacation_rentals: Option<bool>,
    /// Minimum bedrooms (vacation rentals)
    pub bedrooms: Option<i64>,
    /// Maximum properties to return (default: 20)
    pub max_results: Option<usize>,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct AmadeusHotelsByCityParams {
    /// City IATA code (e.g. "PAR")
    pub city_code: String,
    /// Search radius around the city center
    pub radius: Option<i64>,
    /// Radius unit (KM or MILE)
    pub radius_unit: Option<String>,
    /// Comma-separated hotel chain codes
    pub chain_codes: Option<String>,
    /// Comma-separated amenities (e.g. "WIFI,SPA")
    pub amenities: Option<String>,
    /// Comma-separated star ratings (1-5)
    pub ratings: Option<String>,
    /// Content source (e.g. "ALL")
    pub hotel_source: Option<String>,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct AmadeusHotelsByGeocodeParams {
    /// Latitude of the search center
    pub latitude: f64,
    /// Longitude of the search center
    pub longitude: f64,
    /// Search radius
    pub radius: Option<i64>,
    /// Radius unit (KM or MILE)
    pub radius_unit: Option<String>,
    /// Comma-separated hotel chain codes
    pub chain_codes: Option<String>,
    /// Comma-separated amenities
    pub amenities: Option<String>,
    /// Comma-separated star ratings
    pub ratings: Option<String>,
    /// Content source
    pub hotel_source: Option<String>,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct AmadeusHotelOffersParams {
    /// City IATA code; this or hotel_ids is required
    pub city_code: Option<String>,
    /// Comma-separated Amadeus hotel ids; this or city_code is required
    pub hotel_ids: Option<String>,
    /// Check-in date (YYYY-MM-DD)
    pub check_in_date: Option<String>,
    /// Check-out date (YYYY-MM-DD)
    pub check_out_date: Option<String>,
    /// Number of adults per room (default: 1)
    pub adults: Option<i64>,
    /// Number of rooms
    pub room_quantity: Option<i64>,
    /// Price range filter (e.g. "100-300")
    pub price_range: Option<String>,
    /// Currency code for prices
    pub currency: Option<String>,
    /// Payment policy filter (e.g. "GUARANTEE")
    pub payment_policy: Option<String>,
    /// Meal plan filter (e.g. "BREAKFAST")
    pub board_type: Option<String>,
    /// Include sold-out properties
    pub include_closed: Option<bool>,
    /// Return only the best rate per hotel
    pub best_rate_only: Option<bool>,
    /// Response view (e.g. "FULL")
    pub view: Option<String>,
    /// Sort order (e.g. "PRICE")
    pub sort: Option<String>,
    /// Language for descriptions
    pub lang: Option<String>,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct EventSearchParams {
    /// Event search query (e.g. "concerts", "food festivals")
    pub query: String,
    /// Location appended to the query (e.g. "Austin, TX")
    pub location: Option<String>,
    /// Date filter (e.g. "today", "week", "month")
    pub date_filter: Option<String>,
    /// Event type filter (e.g. "Virtual-Event")
    pub event_type: Option<String>,
    /// Language code (default: en)
    pub language: Option<String>,
    /// Country code (default: us)
    pub country: Option<String>,
    /// Maximum events to return (default: 20)
    pub max_results: Option<usize>,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct ActivitySearchParams {
    /// Latitude of the search center
    pub latitude: f64,
    /// Longitude of the search center
    pub longitude: f64,
    /// Search radius (default: 1)
    pub radius: Option<i64>,
    /// Radius unit (default: KM)
    pub radius_unit: Option<String>,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct ActivityDetailsParams {
    /// Amadeus activity id
    pub activity_id: String,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct GeocodeParams {
    /// Place name or address to geocode
    pub location: String,
    /// Return only the single best match (default: true)
    pub exactly_one: Option<bool>,
    /// Preferred result language (default: en)
    pub language: Option<String>,
    /// Include structured address details (default: true)
    pub addressdetails: Option<bool>,
    /// Comma-separated ISO country codes to restrict results
    pub country_codes: Option<String>,
    /// Candidate count when exactly_one is false (default: 5)
    pub limit: Option<usize>,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct ReverseGeocodeParams {
    /// Latitude to resolve
    pub latitude: f64,
    /// Longitude to resolve
    pub longitude: f64,
    /// Preferred result language (default: en)
    pub language: Option<String>,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct DistanceParams {
    /// Latitude of the first point
    pub lat1: f64,
    /// Longitude of the first point
    pub lon1: f64,
    /// Latitude of the second point
    pub lat2: f64,
    /// Longitude of the second point
    pub lon2: f64,
    /// Preferred unit: km, miles or nm (default: km)
    pub unit: Option<String>,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct CurrencyParams {
    /// Source currency code (e.g. "USD")
    pub from_currency: String,
    /// Target currency code (e.g. "EUR")
    pub to_currency: String,
    /// Amount to convert (default: 1.0)
    pub amount: Option<f64>,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct WeatherParams {
    /// Latitude of the forecast location
    pub latitude: f64,
    /// Longitude of the forecast location
    pub longitude: f64,
    /// Hourly periods instead of daily (default: false)
    pub hourly: Option<bool>,
}

// ---------- Server ----------

#[derive(Clone)]
pub struct TravelConciergeServer {
    search: Arc<dyn SearchProvider>,
    amadeus: AmadeusClient,
    rates: Arc<dyn RateSource>,
    geocoder: Arc<GeocodingClient>,
    weather: Arc<dyn ForecastProvider>,
    tool_router: ToolRouter<Self>,
}

/// Success payload: the JSON object serialized into text content.
fn json_success(payload: &Value) -> CallToolResult {
    CallToolResult::success(vec![Content::text(payload.to_string())])
}

/// Failure payload: the uniform error body, flagged as an error result.
fn json_failure(err: &TravelError) -> CallToolResult {
    warn!(error = %err, "Tool call failed");
    CallToolResult::error(vec![Content::text(err.to_body().to_string())])
}

fn to_result(outcome: crate::error::Result<Value>) -> Result<CallToolResult, McpError> {
    match outcome {
        Ok(payload) => Ok(json_success(&payload)),
        Err(err) => Ok(json_failure(&err)),
    }
}

fn join_ints(values: &[i64]) -> String {
    values
        .iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

fn truncate(values: Option<&Value>, max_results: usize) -> Vec<Value> {
    values
        .and_then(Value::as_array)
        .map(|entries| entries.iter().take(max_results).cloned().collect())
        .unwrap_or_default()
}

/// Restructure the per-flight emissions block into labeled gram counts.
fn restructure_emissions(mut flights: Vec<Value>) -> Vec<Value> {
    for flight in &mut flights {
        let Some(emissions) = flight.get("carbon_emissions").cloned() else {
            continue;
        };
        if let Some(map) = flight.as_object_mut() {
            map.insert(
                "carbon_emissions".into(),
                json!({
                    "this_flight_grams": emissions.get("this_flight"),
                    "typical_for_route_grams": emissions.get("typical_for_this_route"),
                    "difference_percent": emissions.get("difference_percent"),
                    "note": "Negative difference % indicates lower emissions than typical for this route",
                }),
            );
        }
    }
    flights
}

fn trip_type_label(trip_type: i64) -> &'static str {
    match trip_type {
        1 => "Round trip",
        2 => "One way",
        _ => "Multi-city",
    }
}

fn travel_class_label(travel_class: i64) -> &'static str {
    usize::try_from(travel_class.saturating_sub(1))
        .ok()
        .and_then(|index| TRAVEL_CLASS_LABELS.get(index))
        .copied()
        .unwrap_or(TRAVEL_CLASS_LABELS[0])
}

/// Combine the date and event-type chips into one filter expression.
fn event_filter_chips(date_filter: Option<&str>, event_type: Option<&str>) -> Option<String> {
    let chips: Vec<String> = [
        date_filter.map(|v| format!("date:{v}")),
        event_type.map(|v| format!("event_type:{v}")),
    ]
    .into_iter()
    .flatten()
    .collect();
    if chips.is_empty() {
        None
    } else {
        Some(chips.join(","))
    }
}

#[tool_router]
impl TravelConciergeServer {
    pub fn new(
        search: Arc<dyn SearchProvider>,
        amadeus: AmadeusClient,
        rates: Arc<dyn RateSource>,
        geocoder: Arc<GeocodingClient>,
        weather: Arc<dyn ForecastProvider>,
    ) -> Self {
        Self {
            search,
            amadeus,
            rates,
            geocoder,
            weather,
            tool_router: Self::tool_router(),
        }
    }

    async fn run_flight_search(&self, params: FlightSearchParams) -> crate::error::Result<Value> {
        validate_date(&params.outbound_date, "outbound_date")?;
        if let Some(return_date) = &params.return_date {
            validate_date(return_date, "return_date")?;
        }

        let trip_type = params.trip_type.unwrap_or(1);
        let adults = params.adults.unwrap_or(1);
        let children = params.children.unwrap_or(0);
        let infants_in_seat = params.infants_in_seat.unwrap_or(0);
        let infants_on_lap = params.infants_on_lap.unwrap_or(0);
        let travel_class = params.travel_class.unwrap_or(1);
        let currency = params.currency.unwrap_or_else(|| "USD".to_string());
        let country = params.country.unwrap_or_else(|| "us".to_string());
        let language = params.language.unwrap_or_else(|| "en".to_string());
        let max_results = params.max_results.unwrap_or(10);

        let mut query = Map::new();
        query.insert("departure_id".into(), json!(params.departure_id));
        query.insert("arrival_id".into(), json!(params.arrival_id));
        query.insert("outbound_date".into(), json!(params.outbound_date));
        query.insert("type".into(), json!(trip_type));
        query.insert("adults".into(), json!(adults));
        query.insert("children".into(), json!(children));
        query.insert("infants_in_seat".into(), json!(infants_in_seat));
        query.insert("infants_on_lap".into(), json!(infants_on_lap));
        query.insert("travel_class".into(), json!(travel_class));
        query.insert("currency".into(), json!(currency));
        query.insert("hl".into(), json!(language));
        query.insert("gl".into(), json!(country));
        query.insert("emissions".into(), json!(1));
        if let Some(return_date) = &params.return_date {
            if trip_type == 1 {
                query.insert("return_date".into(), json!(return_date));
            }
        }

        let flight_data = self.search.search(ENGINE_GOOGLE_FLIGHTS, &query).await?;

        Ok(json!({
            "provider": "Google Flights (SerpAPI)",
            "search_metadata": {
                "departure": params.departure_id,
                "arrival": params.arrival_id,
                "outbound_date": params.outbound_date,
                "return_date": params.return_date,
                "trip_type": trip_type_label(trip_type),
                "passengers": {
                    "adults": adults,
                    "children": children,
                    "infants_in_seat": infants_in_seat,
                    "infants_on_lap": infants_on_lap,
                },
                "travel_class": travel_class_label(travel_class),
                "currency": currency,
                "emissions_included": true,
                "accessibility_note": SSR_ADVISORY,
                "search_timestamp": current_timestamp(),
            },
            "best_flights": restructure_emissions(truncate(flight_data.get("best_flights"), max_results)),
            "other_flights": restructure_emissions(truncate(flight_data.get("other_flights"), max_results)),
            "price_insights": flight_data.get("price_insights").cloned().unwrap_or_else(|| json!({})),
            "airports": flight_data.get("airports").cloned().unwrap_or_else(|| json!([])),
        }))
    }

    #[tool(
        name = "search_flights_serpapi",
        description = "Searches Google Flights for best deals and routes with carbon emissions data. Takes departure and arrival locations, travel dates, passenger counts by type, seat class and currency. Returns curated flight options with prices, schedules and CO2 emissions per flight."
    )]
    pub async fn search_flights_serpapi(
        &self,
        Parameters(params): Parameters<FlightSearchParams>,
    ) -> Result<CallToolResult, McpError> {
        to_result(self.run_flight_search(params).await)
    }

    #[tool(
        name = "search_flights_amadeus",
        description = "Searches the Amadeus Global Distribution System for professional flight offers with per-cabin carbon emissions. Takes IATA airport codes, travel dates, passenger counts (adults 1-9), cabin class and airline filters. Returns offers with pricing, seat availability and accessibility guidance."
    )]
    pub async fn search_flights_amadeus(
        &self,
        Parameters(params): Parameters<AmadeusFlightParams>,
    ) -> Result<CallToolResult, McpError> {
        let query = FlightOffersQuery {
            origin_location_code: params.origin_location_code,
            destination_location_code: params.destination_location_code,
            departure_date: params.departure_date,
            adults: params.adults,
            return_date: params.return_date,
            children: params.children,
            infants: params.infants,
            travel_class: params.travel_class,
            included_airline_codes: params.included_airline_codes,
            excluded_airline_codes: params.excluded_airline_codes,
            non_stop: params.non_stop,
            currency_code: params.currency_code,
            max_price: params.max_price,
            max: params.max.unwrap_or(250),
        };
        to_result(self.amadeus.search_flight_offers(&query).await)
    }

    async fn run_hotel_search(&self, params: HotelSearchParams) -> crate::error::Result<Value> {
        validate_date(&params.check_in_date, "check_in_date")?;
        validate_date(&params.check_out_date, "check_out_date")?;

        let adults = params.adults.unwrap_or(2);
        let children = params.children.unwrap_or(0);
        let currency = params.currency.unwrap_or_else(|| "USD".to_string());
        let country = params.country.unwrap_or_else(|| "us".to_string());
        let language = params.language.unwrap_or_else(|| "en".to_string());
        let max_results = params.max_results.unwrap_or(20);

        let mut query = Map::new();
        query.insert("q".into(), json!(params.location));
        query.insert("check_in_date".into(), json!(params.check_in_date));
        query.insert("check_out_date".into(), json!(params.check_out_date));
        query.insert("adults".into(), json!(adults));
        query.insert("children".into(), json!(children));
        query.insert("currency".into(), json!(currency));
        query.insert("gl".into(), json!(country));
        query.insert("hl".into(), json!(language));

        if let Some(ages) = params.children_ages.as_deref().filter(|a| !a.is_empty()) {
            query.insert("children_ages".into(), json!(join_ints(ages)));
        }
        if let Some(sort_by) = params.sort_by {
            query.insert("sort_by".into(), json!(sort_by));
        }
        for (name, values) in [
            ("hotel_class", params.hotel_class.as_deref()),
            ("amenities", params.amenities.as_deref()),
            ("property_types", params.property_types.as_deref()),
            ("brands", params.brands.as_deref()),
        ] {
            if let Some(values) = values.filter(|v| !v.is_empty()) {
                query.insert(name.into(), json!(join_ints(values)));
            }
        }
        // The provider expects literal "true", not a boolean.
        for (name, flag) in [
            ("free_cancellation", params.free_cancellation),
            ("special_offers", params.special_offers),
            ("vacation_rentals", params.vacation_rentals),
        ] {
            if flag == Some(true) {
                query.insert(name.into(), json!("true"));
            }
        }
        if let Some(bedrooms) = params.bedrooms {
            query.insert("bedrooms".into(), json!(bedrooms));
        }

        let hotel_data = self.search.search(ENGINE_GOOGLE_HOTELS, &query).await?;

        let mut properties = truncate(hotel_data.get("properties"), max_results);
        for property in &mut properties {
            let accessibility = extract_hotel_accessibility(property);
            if let Some(map) = property.as_object_mut() {
                map.insert(
                    "accessibility".into(),
                    serde_json::to_value(accessibility).unwrap_or(Value::Null),
                );
            }
        }

        Ok(json!({
            "provider": "Google Hotels (SerpAPI)",
            "search_metadata": {
                "location": params.location,
                "check_in_date": params.check_in_date,
                "check_out_date": params.check_out_date,
                "guests": {
                    "adults": adults,
                    "children": children,
                    "children_ages": params.children_ages.unwrap_or_default(),
                },
                "currency": currency,
                "search_timestamp": current_timestamp(),
            },
            "properties": properties,
            "filters": hotel_data.get("filters").cloned().unwrap_or_else(|| json!({})),
            "search_parameters": hotel_data.get("search_parameters").cloned().unwrap_or_else(|| json!({})),
            "location_info": hotel_data.get("place_results").cloned().unwrap_or_else(|| json!({})),
            "accessibility_included": true,
        }))
    }

    #[tool(
        name = "search_hotels_serpapi",
        description = "Searches Google Hotels for accommodations including hotels and vacation rentals. Takes destination, check-in/out dates, guest counts and optional filters (star rating, amenities, brands, free cancellation). Returns properties with prices, ratings and wheelchair accessibility indicators."
    )]
    pub async fn search_hotels_serpapi(
        &self,
        Parameters(params): Parameters<HotelSearchParams>,
    ) -> Result<CallToolResult, McpError> {
        to_result(self.run_hotel_search(params).await)
    }

    #[tool(
        name = "search_hotels_amadeus_by_city",
        description = "Searches the Amadeus professional hotel inventory by city IATA code. Takes city code and optional radius, chain codes, amenities, star ratings and content source. Returns professional rates and availability."
    )]
    pub async fn search_hotels_amadeus_by_city(
        &self,
        Parameters(params): Parameters<AmadeusHotelsByCityParams>,
    ) -> Result<CallToolResult, McpError> {
        let mut required = Map::new();
        required.insert("cityCode".into(), json!(params.city_code));
        let mut optional = Map::new();
        optional.insert("radius".into(), json!(params.radius));
        optional.insert("radiusUnit".into(), json!(params.radius_unit));
        optional.insert("chainCodes".into(), json!(params.chain_codes));
        optional.insert("amenities".into(), json!(params.amenities));
        optional.insert("ratings".into(), json!(params.ratings));
        optional.insert("hotelSource".into(), json!(params.hotel_source));
        let query = build_optional_params(&required, &optional, &["radius"]);
        to_result(self.amadeus.search_hotels_by_city(&query).await)
    }

    #[tool(
        name = "search_hotels_amadeus_geocode",
        description = "Searches Amadeus hotels near specific coordinates. Takes latitude, longitude and optional radius with unit, chain codes, amenities and star ratings. Returns hotels sorted by distance with rates and amenities."
    )]
    pub async fn search_hotels_amadeus_geocode(
        &self,
        Parameters(params): Parameters<AmadeusHotelsByGeocodeParams>,
    ) -> Result<CallToolResult, McpError> {
        let mut required = Map::new();
        required.insert("latitude".into(), json!(params.latitude));
        required.insert("longitude".into(), json!(params.longitude));
        let mut optional = Map::new();
        optional.insert("radius".into(), json!(params.radius));
        optional.insert("radiusUnit".into(), json!(params.radius_unit));
        optional.insert("chainCodes".into(), json!(params.chain_codes));
        optional.insert("amenities".into(), json!(params.amenities));
        optional.insert("ratings".into(), json!(params.ratings));
        optional.insert("hotelSource".into(), json!(params.hotel_source));
        let query = build_optional_params(&required, &optional, &["radius"]);
        to_result(self.amadeus.search_hotels_by_geocode(&query).await)
    }

    #[tool(
        name = "search_hotel_offers_amadeus",
        description = "Retrieves real-time hotel booking offers from Amadeus. Takes a city code or hotel ids, check-in/out dates, guest count and optional filters (price range, board type, payment policy). Returns room offers with rates and cancellation policies."
    )]
    pub async fn search_hotel_offers_amadeus(
        &self,
        Parameters(params): Parameters<AmadeusHotelOffersParams>,
    ) -> Result<CallToolResult, McpError> {
        let mut required = Map::new();
        required.insert("adults".into(), json!(params.adults.unwrap_or(1)));
        let mut optional = Map::new();
        optional.insert("cityCode".into(), json!(params.city_code));
        optional.insert("hotelIds".into(), json!(params.hotel_ids));
        optional.insert("checkInDate".into(), json!(params.check_in_date));
        optional.insert("checkOutDate".into(), json!(params.check_out_date));
        optional.insert("roomQuantity".into(), json!(params.room_quantity));
        optional.insert("priceRange".into(), json!(params.price_range));
        optional.insert("currency".into(), json!(params.currency));
        optional.insert("paymentPolicy".into(), json!(params.payment_policy));
        optional.insert("boardType".into(), json!(params.board_type));
        optional.insert("includeClosed".into(), json!(params.include_closed));
        optional.insert("bestRateOnly".into(), json!(params.best_rate_only));
        optional.insert("view".into(), json!(params.view));
        optional.insert("sort".into(), json!(params.sort));
        optional.insert("lang".into(), json!(params.lang));
        let query = build_optional_params(
            &required,
            &optional,
            &["roomQuantity", "includeClosed", "bestRateOnly"],
        );
        to_result(self.amadeus.search_hotel_offers(&query).await)
    }

    async fn run_event_search(&self, params: EventSearchParams) -> crate::error::Result<Value> {
        let mut search_query = params.query.clone();
        if let Some(location) = &params.location {
            search_query.push_str(&format!(" in {location}"));
        }
        let language = params.language.unwrap_or_else(|| "en".to_string());
        let country = params.country.unwrap_or_else(|| "us".to_string());
        let max_results = params.max_results.unwrap_or(20);

        let mut query = Map::new();
        query.insert("q".into(), json!(search_query));
        query.insert("hl".into(), json!(language));
        query.insert("gl".into(), json!(country));
        if let Some(chips) =
            event_filter_chips(params.date_filter.as_deref(), params.event_type.as_deref())
        {
            query.insert("htichips".into(), json!(chips));
        }

        let event_data = self.search.search(ENGINE_GOOGLE_EVENTS, &query).await?;

        Ok(json!({
            "provider": "Google Events (SerpAPI)",
            "search_metadata": {
                "query": params.query,
                "location": params.location,
                "date_filter": params.date_filter,
                "event_type": params.event_type,
                "language": language,
                "country": country,
                "search_timestamp": current_timestamp(),
            },
            "events": truncate(event_data.get("events_results"), max_results),
            "search_parameters": event_data.get("search_parameters").cloned().unwrap_or_else(|| json!({})),
        }))
    }

    #[tool(
        name = "search_events_serpapi",
        description = "Searches Google Events for local festivals, shows and experiences. Takes a search query, optional location, date filter and event type. Returns curated events with dates, venues and ticketing information."
    )]
    pub async fn search_events_serpapi(
        &self,
        Parameters(params): Parameters<EventSearchParams>,
    ) -> Result<CallToolResult, McpError> {
        to_result(self.run_event_search(params).await)
    }

    #[tool(
        name = "search_activities_amadeus",
        description = "Searches Amadeus professional tours and activities by coordinates. Takes latitude, longitude and optional radius (default 1 KM). Returns curated tours with descriptions, pricing and booking details."
    )]
    pub async fn search_activities_amadeus(
        &self,
        Parameters(params): Parameters<ActivitySearchParams>,
    ) -> Result<CallToolResult, McpError> {
        let mut query = Map::new();
        query.insert("latitude".into(), json!(params.latitude));
        query.insert("longitude".into(), json!(params.longitude));
        query.insert("radius".into(), json!(params.radius.unwrap_or(1)));
        query.insert(
            "radiusUnit".into(),
            json!(params.radius_unit.unwrap_or_else(|| "KM".to_string())),
        );
        to_result(self.amadeus.search_activities(&query).await)
    }

    #[tool(
        name = "get_activity_details_amadeus",
        description = "Retrieves complete activity details from Amadeus by activity id, including schedules, pricing, requirements and booking links."
    )]
    pub async fn get_activity_details_amadeus(
        &self,
        Parameters(params): Parameters<ActivityDetailsParams>,
    ) -> Result<CallToolResult, McpError> {
        to_result(self.amadeus.activity_details(&params.activity_id).await)
    }

    #[tool(
        name = "geocode_location",
        description = "Converts place names and addresses to geographic coordinates. Takes a location query, optional language, country filter and match count preference. Returns latitude/longitude, full address and raw provider data."
    )]
    pub async fn geocode_location(
        &self,
        Parameters(params): Parameters<GeocodeParams>,
    ) -> Result<CallToolResult, McpError> {
        let exactly_one = params.exactly_one.unwrap_or(true);
        let options = ForwardOptions {
            language: params.language.unwrap_or_else(|| "en".to_string()),
            addressdetails: params.addressdetails.unwrap_or(true),
            country_codes: params.country_codes,
            limit: if exactly_one {
                1
            } else {
                params.limit.unwrap_or(5)
            },
        };
        to_result(
            self.geocoder
                .geocode(&params.location, exactly_one, &options)
                .await,
        )
    }

    #[tool(
        name = "reverse_geocode",
        description = "Converts geographic coordinates to the nearest address. Takes latitude, longitude and an optional language. Returns the resolved address with raw provider data."
    )]
    pub async fn reverse_geocode(
        &self,
        Parameters(params): Parameters<ReverseGeocodeParams>,
    ) -> Result<CallToolResult, McpError> {
        let language = params.language.unwrap_or_else(|| "en".to_string());
        to_result(
            self.geocoder
                .reverse_geocode(params.latitude, params.longitude, &language)
                .await,
        )
    }

    #[tool(
        name = "calculate_distance",
        description = "Calculates the great-circle distance between two coordinate pairs. Takes two latitude/longitude pairs and a unit preference (km, miles, nm). Returns the distance in the requested unit plus all units."
    )]
    pub async fn calculate_distance(
        &self,
        Parameters(params): Parameters<DistanceParams>,
    ) -> Result<CallToolResult, McpError> {
        let unit = params.unit.unwrap_or_else(|| "km".to_string()).to_lowercase();
        let outcome = distance_between(params.lat1, params.lon1, params.lat2, params.lon2).map(
            |distance| {
                let value = match unit.as_str() {
                    "miles" => distance.miles,
                    "nm" => distance.nautical_miles,
                    _ => distance.kilometers,
                };
                json!({
                    "point1": { "latitude": params.lat1, "longitude": params.lon1 },
                    "point2": { "latitude": params.lat2, "longitude": params.lon2 },
                    "distance": { "value": value, "unit": unit },
                    "all_units": {
                        "kilometers": distance.kilometers,
                        "miles": distance.miles,
                        "nautical_miles": distance.nautical_miles,
                    },
                    "calculation_timestamp": current_timestamp(),
                })
            },
        );
        to_result(outcome)
    }

    #[tool(
        name = "convert_currency",
        description = "Converts amounts between currencies using live ExchangeRate-API rates. Takes source and target currency codes and an optional amount (default 1.0). Returns the exchange rate and the converted amount."
    )]
    pub async fn convert_currency(
        &self,
        Parameters(params): Parameters<CurrencyParams>,
    ) -> Result<CallToolResult, McpError> {
        to_result(
            convert_currency(
                self.rates.as_ref(),
                &params.from_currency,
                &params.to_currency,
                params.amount.unwrap_or(1.0),
            )
            .await,
        )
    }

    #[tool(
        name = "get_weather_forecast",
        description = "Fetches a National Weather Service forecast for US coordinates. Takes latitude, longitude and an hourly flag. Returns forecast periods with temperatures and conditions."
    )]
    pub async fn get_weather_forecast(
        &self,
        Parameters(params): Parameters<WeatherParams>,
    ) -> Result<CallToolResult, McpError> {
        to_result(
            self.weather
                .forecast(
                    params.latitude,
                    params.longitude,
                    params.hourly.unwrap_or(false),
                )
                .await,
        )
    }
}

#[tool_handler]
impl ServerHandler for TravelConciergeServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Travel concierge server combining consumer search and professional GDS data. \
                 Use search_flights_serpapi or search_flights_amadeus for flights, \
                 search_hotels_serpapi and the search_hotels_amadeus_* tools for stays, \
                 search_events_serpapi and search_activities_amadeus for things to do, \
                 geocode_location / reverse_geocode / calculate_distance for places, \
                 convert_currency for budgeting, and get_weather_forecast for US weather."
                    .into(),
            ),
        }
    }
}
