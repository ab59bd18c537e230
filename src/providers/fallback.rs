use crate::core::currency::{RateTable, RateTableProvider};
use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, warn};

/// Makes rate lookup infallible.
///
/// A failed fetch yields the fallback table. A successful fetch has any
/// entries it lacks filled in from the fallback table.
pub struct FallbackRateProvider<T: RateTableProvider> {
    inner: T,
    fallback: RateTable,
}

impl<T: RateTableProvider> FallbackRateProvider<T> {
    pub fn new(inner: T, fallback: RateTable) -> Self {
        Self { inner, fallback }
    }

    pub async fn rates(&self) -> RateTable {
        match self.inner.fetch_rates().await {
            Ok(table) => {
                debug!("Fetched rate table with {} currencies", table.rates.len());
                table.with_missing_from(&self.fallback)
            }
            Err(e) => {
                warn!("Failed to fetch rates, using built-in fallback table: {e}");
                self.fallback.clone()
            }
        }
    }
}

#[async_trait]
impl<T: RateTableProvider> RateTableProvider for FallbackRateProvider<T> {
    async fn fetch_rates(&self) -> Result<RateTable> {
        Ok(self.rates().await)
    }
}
