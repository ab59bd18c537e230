use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, instrument};

use super::util::{http_client, with_retry};
use crate::core::currency::{ANCHOR, CurrencyCode, RateTable, RateTableProvider};

/// Fetches anchor-relative currency rates from an ExchangeRate-API style
/// endpoint (`{base_url}/latest/USD`).
pub struct ExchangeRateApiProvider {
    base_url: String,
}

impl ExchangeRateApiProvider {
    pub fn new(base_url: &str) -> Self {
        ExchangeRateApiProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    result: Option<String>,
    #[serde(rename = "error-type")]
    error_type: Option<String>,
    rates: Option<HashMap<String, f64>>,
}

/// Metals quoted as ounces per anchor unit; the spot price is the inverse.
fn spot_from_quote(quote: Option<&f64>) -> Option<f64> {
    quote
        .copied()
        .filter(|q| q.is_finite() && *q > 0.0)
        .map(|q| 1.0 / q)
}

fn into_rate_table(rates: HashMap<String, f64>) -> RateTable {
    let mut table = RateTable::new();
    table.gold = spot_from_quote(rates.get("XAU"));
    table.silver = spot_from_quote(rates.get("XAG"));
    for (code, rate) in rates {
        if code == "XAU" || code == "XAG" {
            continue;
        }
        match code.parse::<CurrencyCode>() {
            Ok(code) => {
                table.rates.insert(code, rate);
            }
            Err(e) => debug!("Skipping rate entry {code}: {e}"),
        }
    }
    table
}

#[async_trait]
impl RateTableProvider for ExchangeRateApiProvider {
    #[instrument(name = "ExchangeRateFetch", skip(self))]
    async fn fetch_rates(&self) -> Result<RateTable> {
        let url = format!("{}/latest/{}", self.base_url, ANCHOR);
        debug!("Requesting currency rates from {}", url);

        let client = http_client()?;
        let response = with_retry(|| client.get(&url).send(), 2, 500)
            .await
            .map_err(|e| anyhow!("Request error: {} for URL: {}", e, url))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for currency rates",
                response.status()
            ));
        }

        let text = response.text().await?;
        let data: LatestRatesResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse currency rates response: {}", e))?;

        if data.result.as_deref() == Some("error") {
            return Err(anyhow!(
                "Rate service returned an error: {}",
                data.error_type.as_deref().unwrap_or("unknown")
            ));
        }

        let rates = data
            .rates
            .filter(|rates| !rates.is_empty())
            .ok_or_else(|| anyhow!("No currency rates found for base {}", ANCHOR))?;

        let table = into_rate_table(rates);
        debug!("Fetched {} currency rates", table.rates.len());
        Ok(table)
    }
}
