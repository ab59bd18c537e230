use anyhow::Result;
use async_trait::async_trait;
use futures::future::join;
use tracing::{debug, warn};

use crate::core::currency::{RateTable, RateTableProvider};

/// Joins a currency rate source with a commodity spot source.
///
/// Both are queried concurrently. Currency rates are required; when the
/// spot source fails the table is returned without commodity prices.
pub struct CombinedRateProvider<C: RateTableProvider, M: RateTableProvider> {
    currencies: C,
    metals: M,
}

impl<C: RateTableProvider, M: RateTableProvider> CombinedRateProvider<C, M> {
    pub fn new(currencies: C, metals: M) -> Self {
        Self { currencies, metals }
    }
}

#[async_trait]
impl<C: RateTableProvider, M: RateTableProvider> RateTableProvider for CombinedRateProvider<C, M> {
    async fn fetch_rates(&self) -> Result<RateTable> {
        let (currencies, metals) =
            join(self.currencies.fetch_rates(), self.metals.fetch_rates()).await;
        let mut table = currencies?;

        match metals {
            Ok(metals) => {
                debug!("Using fetched commodity spot prices");
                if metals.gold.is_some() {
                    table.gold = metals.gold;
                }
                if metals.silver.is_some() {
                    table.silver = metals.silver;
                }
            }
            Err(e) => warn!("Failed to fetch commodity spot prices: {e}"),
        }
        Ok(table)
    }
}
