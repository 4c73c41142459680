use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, instrument};

use crate::core::currency::CurrencyCode;
use crate::core::rates::{RateError, RateProvider, RateTable};

// ExchangeRateApiProvider implementation for RateProvider
pub struct ExchangeRateApiProvider {
    base_url: String,
    client: reqwest::Client,
}

impl ExchangeRateApiProvider {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("fxlive/0.1")
            .build()
            .context("Failed to build HTTP client")?;
        Ok(ExchangeRateApiProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    rates: HashMap<String, serde_json::Value>,
}

/// Keeps only finite, positive numeric rates.
fn usable_rates(raw: HashMap<String, serde_json::Value>) -> HashMap<String, f64> {
    raw.into_iter()
        .filter_map(|(code, value)| match value.as_f64() {
            Some(rate) if rate.is_finite() && rate > 0.0 => Some((code.to_uppercase(), rate)),
            _ => {
                debug!(%code, %value, "Dropping unusable rate");
                None
            }
        })
        .collect()
}

#[async_trait]
impl RateProvider for ExchangeRateApiProvider {
    #[instrument(name = "LatestRatesFetch", skip(self), fields(base = %base))]
    async fn latest(&self, base: CurrencyCode) -> Result<RateTable, RateError> {
        let url = format!("{}/latest/{}", self.base_url, base);
        debug!("Requesting exchange rates from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| RateError::Network {
                base,
                reason: format!("Request error: {e}"),
            })?;

        if !response.status().is_success() {
            return Err(RateError::Network {
                base,
                reason: format!("HTTP error: {}", response.status()),
            });
        }

        let text = response.text().await.map_err(|e| RateError::Network {
            base,
            reason: format!("Failed to read response body: {e}"),
        })?;

        let data: LatestRatesResponse =
            serde_json::from_str(&text).map_err(|e| RateError::MalformedResponse {
                base,
                reason: format!("Failed to parse JSON response: {e}"),
            })?;

        let rates = usable_rates(data.rates);
        debug!(count = rates.len(), "Received exchange rates");
        Ok(RateTable { base, rates })
    }
}
