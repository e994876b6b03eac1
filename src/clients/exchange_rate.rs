//! ExchangeRate-API currency client
//!
//! The API key rides in the URL path, so every error path here must go
//! through [`sanitize_url_for_logging`] or avoid the URL entirely. Error
//! messages returned to callers are deliberately generic.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::error::{Result, TravelError};
use crate::response::{current_timestamp, sanitize_url_for_logging};
use crate::validate::normalize_currency_code;

pub const PROVIDER_NAME: &str = "exchangerate-api";

/// Exchange-rate boundary, mockable for tests
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Fetch the conversion rate from one uppercased ISO 4217 code to another.
    async fn pair_rate(&self, from: &str, to: &str) -> Result<f64>;
}

/// HTTP client for v6.exchangerate-api.com
pub struct ExchangeRateApi {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl ExchangeRateApi {
    pub fn new(api_key: Option<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: super::http_client(timeout)?,
            api_key,
            base_url: "https://v6.exchangerate-api.com".to_string(),
        })
    }
}

#[async_trait]
impl RateSource for ExchangeRateApi {
    async fn pair_rate(&self, from: &str, to: &str) -> Result<f64> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| {
                TravelError::config("EXCHANGE_RATE_API_KEY environment variable is required")
            })?;

        let url = format!("{}/v6/{api_key}/pair/{from}/{to}", self.base_url);
        debug!(url = %sanitize_url_for_logging(&url), "Fetching exchange rate");

        let response = self.client.get(&url).send().await.map_err(|_| {
            // The reqwest error can echo the URL, which embeds the key.
            TravelError::transport(
                "Currency API request failed. Please check currency codes and try again.",
            )
        })?;

        if !response.status().is_success() {
            return Err(TravelError::transport(
                "Currency API request failed. Please check currency codes and try again.",
            ));
        }

        let data: Value = response.json().await.map_err(|_| {
            TravelError::transport("Currency conversion failed. Please try again.")
        })?;

        if data.get("result").and_then(Value::as_str) != Some("success") {
            let kind = data
                .get("error-type")
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            return Err(TravelError::provider("ExchangeRate-API", kind));
        }

        data.get("conversion_rate")
            .and_then(Value::as_f64)
            .ok_or_else(|| TravelError::provider("ExchangeRate-API", "Conversion rate not available"))
    }
}

/// Convert an amount between currencies and assemble the tool payload.
pub async fn convert_currency(
    rates: &dyn RateSource,
    from_currency: &str,
    to_currency: &str,
    amount: f64,
) -> Result<Value> {
    if amount <= 0.0 || !amount.is_finite() {
        return Err(TravelError::validation("amount must be greater than zero"));
    }
    let from = normalize_currency_code(from_currency)?;
    let to = normalize_currency_code(to_currency)?;

    info!(%from, %to, amount, "Converting currency");
    let rate = rates.pair_rate(&from, &to).await?;
    let converted_amount = (amount * rate * 100.0).round() / 100.0;

    Ok(json!({
        "search_metadata": {
            "from_currency": from,
            "to_currency": to,
            "amount": amount,
            "search_timestamp": current_timestamp(),
            "provider": PROVIDER_NAME,
        },
        "exchange_rate": rate,
        "conversion": {
            "original_amount": amount,
            "converted_amount": converted_amount,
            "rate": rate,
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedRate(f64);

    #[async_trait]
    impl RateSource for FixedRate {
        async fn pair_rate(&self, from: &str, to: &str) -> Result<f64> {
            // Callers must normalize before reaching the rate source.
            assert_eq!(from, from.to_uppercase());
            assert_eq!(to, to.to_uppercase());
            Ok(self.0)
        }
    }

    #[tokio::test]
    async fn test_usd_to_eur_conversion() {
        let payload = convert_currency(&FixedRate(0.92), "usd", "eur", 100.0)
            .await
            .unwrap();
        assert_eq!(payload["conversion"]["converted_amount"], 92.0);
        assert_eq!(payload["exchange_rate"], 0.92);
        assert_eq!(payload["search_metadata"]["from_currency"], "USD");
        assert_eq!(payload["search_metadata"]["to_currency"], "EUR");
        assert_eq!(payload["search_metadata"]["provider"], PROVIDER_NAME);
    }

    #[tokio::test]
    async fn test_conversion_rounds_to_two_decimals() {
        let payload = convert_currency(&FixedRate(0.333333), "USD", "GBP", 10.0)
            .await
            .unwrap();
        assert_eq!(payload["conversion"]["converted_amount"], 3.33);
    }

    #[tokio::test]
    async fn test_invalid_inputs_rejected_before_lookup() {
        struct Unreachable;

        #[async_trait]
        impl RateSource for Unreachable {
            async fn pair_rate(&self, _: &str, _: &str) -> Result<f64> {
                panic!("rate source must not be called");
            }
        }

        assert!(convert_currency(&Unreachable, "USD", "EUR", 0.0).await.is_err());
        assert!(convert_currency(&Unreachable, "dollars", "EUR", 1.0).await.is_err());
    }

    #[tokio::test]
    async fn test_missing_key_is_a_config_error() {
        let api = ExchangeRateApi::new(None, Duration::from_secs(1)).unwrap();
        let err = api.pair_rate("USD", "EUR").await.unwrap_err();
        assert!(matches!(err, TravelError::Config { .. }));
        assert!(err.to_string().contains("EXCHANGE_RATE_API_KEY"));
    }
}
