use crate::core::currency::{CurrencyCode, RateTable};
use crate::core::projection::DEFAULT_HORIZON_MONTHS;
use crate::core::snapshot::FinancialSnapshot;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_RATES_URL: &str = "https://open.er-api.com/v6";
pub const DEFAULT_METALS_URL: &str = "https://api.gold-api.com";

fn default_ttl_hours() -> u64 {
    12
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RatesProviderConfig {
    pub base_url: String,
    #[serde(default = "default_ttl_hours")]
    pub ttl_hours: u64,
}

impl RatesProviderConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_hours.saturating_mul(60 * 60))
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MetalsProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub rates: Option<RatesProviderConfig>,
    pub metals: Option<MetalsProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            rates: Some(RatesProviderConfig {
                base_url: DEFAULT_RATES_URL.to_string(),
                ttl_hours: default_ttl_hours(),
            }),
            metals: Some(MetalsProviderConfig {
                base_url: DEFAULT_METALS_URL.to_string(),
            }),
        }
    }
}

fn default_months() -> u32 {
    DEFAULT_HORIZON_MONTHS
}

/// Defaults for the cash balance projection.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProjectionConfig {
    #[serde(default = "default_months")]
    pub months: u32,
    #[serde(default)]
    pub monthly_contribution: f64,
    /// Balance to start from. Total cash holdings when unset.
    pub starting_balance: Option<f64>,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            months: default_months(),
            monthly_contribution: 0.0,
            starting_balance: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub currency: CurrencyCode,
    #[serde(default)]
    pub snapshot: FinancialSnapshot,
    /// Fixed rates. When present no rates are fetched.
    pub rates: Option<RateTable>,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub projection: ProjectionConfig,
    pub data_path: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("", "", "networth").context("Could not determine project directories")
    }

    pub fn default_config_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        Ok(Self::project_dirs()?.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}
