//! Currency and commodity conversion.
//!
//! Every amount is converted through a single anchor currency. Rates are
//! anchor-relative multipliers: `rate(EUR) = 0.92` means one anchor unit buys
//! 0.92 EUR. Gold and silver are held by weight and priced per troy ounce in
//! the anchor currency.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;
use tracing::debug;

/// Grams in one troy ounce.
pub const TROY_OUNCE_GRAMS: f64 = 31.1035;

/// Currency every rate in a [`RateTable`] is expressed against.
pub const ANCHOR: &str = "USD";

/// Replaces NaN and infinities with zero.
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

/// Adds amounts up starting from positive zero.
///
/// `Iterator::sum` over no `f64`s yields `-0.0`; an empty category must
/// total exactly `0`.
pub fn sum_amounts(amounts: impl IntoIterator<Item = f64>) -> f64 {
    amounts.into_iter().fold(0.0, |total, amount| total + amount)
}

/// An upper-cased currency code such as `USD` or `EGP`.
///
/// The set of codes is open; only blank or non-alphanumeric codes are
/// rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn anchor() -> Self {
        Self(ANCHOR.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for CurrencyCode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        if code.is_empty() {
            return Err(anyhow!("Currency code cannot be empty"));
        }
        if !code.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(anyhow!("Invalid currency code: {}", s));
        }
        Ok(Self(code.to_ascii_uppercase()))
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

impl Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// What an amount is denominated in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unit {
    Currency(CurrencyCode),
    GoldGram,
    SilverGram,
}

impl From<CurrencyCode> for Unit {
    fn from(code: CurrencyCode) -> Self {
        Unit::Currency(code)
    }
}

impl From<&CurrencyCode> for Unit {
    fn from(code: &CurrencyCode) -> Self {
        Unit::Currency(code.clone())
    }
}

/// Anchor-relative exchange rates plus commodity spot prices.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    #[serde(rename = "Gold", default, skip_serializing_if = "Option::is_none")]
    pub gold: Option<f64>,
    #[serde(rename = "Silver", default, skip_serializing_if = "Option::is_none")]
    pub silver: Option<f64>,
    #[serde(flatten)]
    pub rates: HashMap<CurrencyCode, f64>,
}

fn usable(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

impl RateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table shipped with the binary for when no rates can be fetched.
    pub fn fallback() -> Self {
        let rates = [
            ("USD", 1.0),
            ("EUR", 0.92),
            ("GBP", 0.79),
            ("EGP", 48.5),
            ("SAR", 3.75),
            ("AED", 3.6725),
            ("KWD", 0.307),
            ("INR", 83.3),
        ];
        Self {
            gold: Some(4050.0),
            silver: Some(48.0),
            rates: rates
                .into_iter()
                .map(|(code, rate)| (CurrencyCode(code.to_string()), rate))
                .collect(),
        }
    }

    pub fn with_rate(mut self, code: &str, rate: f64) -> Self {
        if let Ok(code) = code.parse() {
            self.rates.insert(code, rate);
        }
        self
    }

    pub fn with_gold(mut self, spot: f64) -> Self {
        self.gold = Some(spot);
        self
    }

    pub fn with_silver(mut self, spot: f64) -> Self {
        self.silver = Some(spot);
        self
    }

    /// Rate of `code` against the anchor. Missing or unusable entries read as 1.
    pub fn rate(&self, code: &CurrencyCode) -> f64 {
        usable(self.rates.get(code).copied()).unwrap_or(1.0)
    }

    /// Gold price per troy ounce in the anchor currency, 1 when unknown.
    pub fn gold_spot(&self) -> f64 {
        usable(self.gold).unwrap_or(1.0)
    }

    /// Silver price per troy ounce in the anchor currency, 1 when unknown.
    pub fn silver_spot(&self) -> f64 {
        usable(self.silver).unwrap_or(1.0)
    }

    /// Fills entries this table lacks from `other`, keeping its own values.
    pub fn with_missing_from(mut self, other: &RateTable) -> Self {
        if usable(self.gold).is_none() {
            self.gold = other.gold;
        }
        if usable(self.silver).is_none() {
            self.silver = other.silver;
        }
        for (code, rate) in &other.rates {
            self.rates.entry(code.clone()).or_insert(*rate);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty() && self.gold.is_none() && self.silver.is_none()
    }
}

/// Converts `amount` from `from` into the currency `to`.
///
/// Never fails: non-finite amounts count as zero and unknown currencies use a
/// rate of 1.
pub fn convert(amount: f64, from: &Unit, to: &CurrencyCode, rates: &RateTable) -> f64 {
    let amount = finite_or_zero(amount);
    match from {
        Unit::Currency(code) if code == to => amount,
        Unit::GoldGram => {
            let anchor_value = amount * rates.gold_spot() / TROY_OUNCE_GRAMS;
            convert(anchor_value, &Unit::Currency(CurrencyCode::anchor()), to, rates)
        }
        Unit::SilverGram => {
            let anchor_value = amount * rates.silver_spot() / TROY_OUNCE_GRAMS;
            convert(anchor_value, &Unit::Currency(CurrencyCode::anchor()), to, rates)
        }
        Unit::Currency(code) => {
            let converted = amount / rates.rate(code) * rates.rate(to);
            debug!("Converted {amount} {code} -> {converted} {to}");
            finite_or_zero(converted)
        }
    }
}

/// Source of a full [`RateTable`], typically a network service.
#[async_trait]
pub trait RateTableProvider: Send + Sync {
    async fn fetch_rates(&self) -> Result<RateTable>;
}

#[async_trait]
impl<T: RateTableProvider + ?Sized> RateTableProvider for Box<T> {
    async fn fetch_rates(&self) -> Result<RateTable> {
        (**self).fetch_rates().await
    }
}
