use anyhow::{Result, anyhow};
use async_trait::async_trait;
use futures::future::try_join;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::util::{http_client, with_retry};
use crate::core::currency::{ANCHOR, RateTable, RateTableProvider};

/// Fetches gold and silver spot prices per troy ounce (`{base_url}/price/XAU`).
pub struct GoldApiProvider {
    base_url: String,
}

impl GoldApiProvider {
    pub fn new(base_url: &str) -> Self {
        GoldApiProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn fetch_spot(&self, client: &reqwest::Client, symbol: &str) -> Result<f64> {
        let url = format!("{}/price/{}", self.base_url, symbol);
        debug!("Requesting spot price from {}", url);

        let response = with_retry(|| client.get(&url).send(), 2, 500)
            .await
            .map_err(|e| anyhow!("Request error: {} for metal: {}", e, symbol))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for metal: {}",
                response.status(),
                symbol
            ));
        }

        let quote = response
            .json::<SpotPriceResponse>()
            .await
            .map_err(|e| anyhow!("Failed to parse spot price for {}: {}", symbol, e))?;

        if let Some(currency) = quote.currency.as_deref() {
            if !currency.eq_ignore_ascii_case(ANCHOR) {
                return Err(anyhow!(
                    "Spot price for {} quoted in {}, expected {}",
                    symbol,
                    currency,
                    ANCHOR
                ));
            }
        }
        if !(quote.price.is_finite() && quote.price > 0.0) {
            return Err(anyhow!("Invalid spot price for {}: {}", symbol, quote.price));
        }
        Ok(quote.price)
    }
}

#[derive(Debug, Deserialize)]
struct SpotPriceResponse {
    price: f64,
    currency: Option<String>,
}

#[async_trait]
impl RateTableProvider for GoldApiProvider {
    #[instrument(name = "MetalSpotFetch", skip(self))]
    async fn fetch_rates(&self) -> Result<RateTable> {
        let client = http_client()?;
        let (gold, silver) =
            try_join(self.fetch_spot(&client, "XAU"), self.fetch_spot(&client, "XAG")).await?;
        debug!("Gold spot {gold}, silver spot {silver}");
        Ok(RateTable::new().with_gold(gold).with_silver(silver))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount(server: &MockServer, symbol: &str, status: u16, body: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/price/{symbol}")))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_successful_spot_fetch() {
        let mock_server = MockServer::start().await;
        mount(
            &mock_server,
            "XAU",
            200,
            r#"{"name": "Gold", "price": 4012.5, "symbol": "XAU", "currency": "USD"}"#,
        )
        .await;
        mount(&mock_server, "XAG", 200, r#"{"price": 47.25, "symbol": "XAG"}"#).await;

        let provider = GoldApiProvider::new(&mock_server.uri());
        let table = provider.fetch_rates().await.unwrap();
        assert_eq!(table.gold_spot(), 4012.5);
        assert_eq!(table.silver_spot(), 47.25);
        assert!(table.rates.is_empty());
    }

    #[tokio::test]
    async fn test_one_metal_failing_fails_the_fetch() {
        let mock_server = MockServer::start().await;
        mount(&mock_server, "XAU", 200, r#"{"price": 4012.5}"#).await;
        mount(&mock_server, "XAG", 503, "").await;

        let provider = GoldApiProvider::new(&mock_server.uri());
        let result = provider.fetch_rates().await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "HTTP error: 503 Service Unavailable for metal: XAG"
        );
    }

    #[tokio::test]
    async fn test_spot_in_wrong_currency() {
        let mock_server = MockServer::start().await;
        mount(&mock_server, "XAU", 200, r#"{"price": 3700, "currency": "EUR"}"#).await;
        mount(&mock_server, "XAG", 200, r#"{"price": 44, "currency": "EUR"}"#).await;

        let provider = GoldApiProvider::new(&mock_server.uri());
        let result = provider.fetch_rates().await;
        assert!(result.unwrap_err().to_string().contains("expected USD"));
    }

    #[tokio::test]
    async fn test_non_positive_spot() {
        let mock_server = MockServer::start().await;
        mount(&mock_server, "XAU", 200, r#"{"price": 0}"#).await;
        mount(&mock_server, "XAG", 200, r#"{"price": 44}"#).await;

        let provider = GoldApiProvider::new(&mock_server.uri());
        let result = provider.fetch_rates().await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "Invalid spot price for XAU: 0"
        );
    }
}
