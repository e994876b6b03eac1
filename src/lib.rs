//! Travel concierge MCP server
//!
//! This library provides the core functionality for flight, hotel, event and
//! activity search, geocoding, distance and currency tools exposed over the
//! Model Context Protocol.

pub mod accessibility;
pub mod clients;
pub mod config;
pub mod error;
pub mod geo;
pub mod params;
pub mod response;
pub mod server;
pub mod validate;

// Re-export core types for public API
pub use accessibility::{FlightAccessibility, HotelAccessibility};
pub use clients::{
    AmadeusClient, AmadeusGateway, ExchangeRateApi, ForecastProvider, GeocodeBackend,
    GeocodingClient, HttpAmadeusGateway, NominatimBackend, NwsClient, RateSource, SearchProvider,
    SerpApiClient,
};
pub use config::ConciergeConfig;
pub use error::TravelError;
pub use server::TravelConciergeServer;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, TravelError>;
