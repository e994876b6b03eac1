//! Travel concierge MCP server binary
//!
//! Wires the upstream clients together from environment configuration and
//! serves the tool router over stdio. Logs go to stderr; stdout belongs to
//! the MCP transport.

use std::sync::Arc;

use anyhow::{Context, Result};
use rmcp::{ServiceExt, transport::stdio};
use tracing::info;

use travel_concierge::clients::{
    AmadeusClient, ExchangeRateApi, GeocodingClient, HttpAmadeusGateway, NominatimBackend,
    NwsClient, SerpApiClient,
};
use travel_concierge::{ConciergeConfig, TravelConciergeServer};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = ConciergeConfig::from_env();
    info!(
        version = travel_concierge::VERSION,
        "Starting travel concierge MCP server"
    );

    let search = Arc::new(
        SerpApiClient::new(config.serpapi_key.clone(), config.http_timeout)
            .context("Failed to initialize SerpAPI client")?,
    );
    let amadeus_gateway = Arc::new(
        HttpAmadeusGateway::new(
            config.amadeus_api_key.clone(),
            config.amadeus_api_secret.clone(),
            config.http_timeout,
        )
        .context("Failed to initialize Amadeus gateway")?,
    );
    let rates = Arc::new(
        ExchangeRateApi::new(config.exchange_rate_api_key.clone(), config.http_timeout)
            .context("Failed to initialize exchange rate client")?,
    );
    // Constructed once so all tool calls share the same request pacers.
    let geocoder = Arc::new(GeocodingClient::new(Arc::new(
        NominatimBackend::new(config.http_timeout)
            .context("Failed to initialize geocoding backend")?,
    )));
    let weather = Arc::new(
        NwsClient::new(config.http_timeout).context("Failed to initialize weather client")?,
    );

    let server = TravelConciergeServer::new(
        search,
        AmadeusClient::new(amadeus_gateway),
        rates,
        geocoder,
        weather,
    );

    info!("Using stdio transport");
    let service = server.serve(stdio()).await.inspect_err(|e| {
        tracing::error!("serving error: {:?}", e);
    })?;

    service.waiting().await?;
    Ok(())
}
