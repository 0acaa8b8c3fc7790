use crate::core::error::RateError;
use crate::core::provider::{MetalRateProvider, RateQuery};
use anyhow::Result;
use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, error, instrument};

// `success` and `error` are read as raw JSON: the rate is what matters, and
// only an explicit `"success": false` counts as a reported failure.
#[derive(Debug, Deserialize)]
struct LatestResponse {
    success: Option<Value>,
    error: Option<Value>,
    rates: Option<HashMap<String, Value>>,
}

impl LatestResponse {
    fn reported_failure(&self) -> bool {
        matches!(self.success, Some(Value::Bool(false)))
    }
}

fn describe_error(error: Option<&Value>) -> String {
    match error {
        None | Some(Value::Null) => "no details".to_string(),
        Some(Value::String(text)) => text.clone(),
        Some(Value::Object(body)) => {
            let detail = ["info", "message"]
                .iter()
                .find_map(|field| body.get(*field).and_then(Value::as_str))
                .unwrap_or("no details");
            match body.get("code").filter(|code| !code.is_null()) {
                Some(Value::String(code)) => format!("{code}: {detail}"),
                Some(code) => format!("{code}: {detail}"),
                None => detail.to_string(),
            }
        }
        Some(other) => other.to_string(),
    }
}

/// Client for the `latest` endpoint of a metalpriceapi-style provider.
pub struct MetalPriceProvider {
    base_url: String,
    client: reqwest::Client,
}

impl MetalPriceProvider {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("goldrate/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn extract_rate(body: &str, symbol: &str) -> Result<f64, RateError> {
        let data: LatestResponse = serde_json::from_str(body).map_err(|e| {
            RateError::InvalidResponseShape(format!("Failed to parse JSON response: {e}"))
        })?;

        if data.reported_failure() {
            let reason = describe_error(data.error.as_ref());
            return Err(RateError::InvalidResponseShape(format!(
                "Provider reported failure: {reason}"
            )));
        }

        let rates = data
            .rates
            .ok_or_else(|| RateError::InvalidResponseShape("Response has no rates".to_string()))?;
        let value = rates.get(symbol).ok_or_else(|| {
            RateError::InvalidResponseShape(format!("No rate found for symbol: {symbol}"))
        })?;
        value.as_f64().ok_or_else(|| {
            RateError::InvalidResponseShape(format!("Rate for {symbol} is not a number: {value}"))
        })
    }
}

#[async_trait]
impl MetalRateProvider for MetalPriceProvider {
    #[instrument(
        name = "MetalPriceFetch",
        skip(self, query),
        fields(base = %query.base_currency, symbol = %query.symbol)
    )]
    async fn latest_rate(&self, query: &RateQuery) -> Result<f64, RateError> {
        let endpoint = format!("{}/latest", self.base_url);
        debug!("Requesting latest rate from {}", endpoint);

        let url = Url::parse_with_params(
            &endpoint,
            &[
                ("api_key", query.api_key.as_str()),
                ("base", query.base_currency.as_str()),
                ("currencies", query.symbol.as_str()),
            ],
        )
        .map_err(|e| RateError::Configuration(format!("Invalid provider URL {endpoint}: {e}")))?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| {
                RateError::UpstreamUnavailable(format!(
                    "Request error: {} for {}/{}",
                    e.without_url(),
                    query.base_currency,
                    query.symbol
                ))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RateError::UpstreamUnavailable(format!(
                "HTTP error: {} for {}/{}",
                status, query.base_currency, query.symbol
            )));
        }

        let text = response.text().await.map_err(|e| {
            RateError::UpstreamUnavailable(format!(
                "Failed to read response body: {}",
                e.without_url()
            ))
        })?;

        let rate = Self::extract_rate(&text, &query.symbol).inspect_err(|e| {
            error!(error = %e, response = %text, "Unexpected provider response");
        })?;
        debug!(rate, "Received provider rate");
        Ok(rate)
    }
}
