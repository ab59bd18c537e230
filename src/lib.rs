pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::config::AppConfig;
use crate::core::currency::{CurrencyCode, RateTable};
use crate::core::{calculate_metrics, expand_schedule, project_cash_balance};
use crate::providers::exchange_rates::ExchangeRateApiProvider;
use crate::providers::fallback::FallbackRateProvider;
use crate::providers::gold_api::GoldApiProvider;
use anyhow::Result;
use chrono::NaiveDate;
use tracing::{debug, info};

pub enum AppCommand {
    Metrics {
        json: bool,
    },
    Obligations,
    Project {
        contribution: Option<f64>,
        starting_balance: Option<f64>,
        months: Option<u32>,
    },
    Rates,
}

/// Settings shared by every command.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Day the reports are computed for.
    pub reference_date: NaiveDate,
    /// Overrides the configured display currency.
    pub currency: Option<CurrencyCode>,
}

impl RunOptions {
    pub fn new(reference_date: NaiveDate) -> Self {
        Self {
            reference_date,
            currency: None,
        }
    }
}

/// Resolves the rate table for this run. Never fails.
///
/// Configured fixed rates win unless empty. Otherwise rates are fetched
/// through the cache, and the built-in table covers whatever could not be
/// fetched.
pub async fn resolve_rates(config: &AppConfig) -> RateTable {
    if let Some(rates) = config.rates.as_ref().filter(|rates| !rates.is_empty()) {
        debug!("Using fixed rates from config");
        return rates.clone();
    }

    let Some(rates_config) = config.providers.rates.as_ref() else {
        info!("No rate provider configured, using built-in rates");
        return RateTable::fallback();
    };
    let source = providers::cached_rate_source(
        ExchangeRateApiProvider::new(&rates_config.base_url),
        config
            .providers
            .metals
            .as_ref()
            .map(|metals| GoldApiProvider::new(&metals.base_url)),
        store::open_rate_cache(config),
        Some(rates_config.ttl()),
    );
    let provider = FallbackRateProvider::new(source, RateTable::fallback());

    let pb = cli::ui::new_spinner("Fetching exchange rates...");
    let rates = provider.rates().await;
    pb.finish_and_clear();
    rates
}

pub async fn run_command(
    command: AppCommand,
    config_path: Option<&str>,
    options: &RunOptions,
) -> Result<()> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let display = options
        .currency
        .clone()
        .unwrap_or_else(|| config.currency.clone());
    let date = options.reference_date;
    let rates = resolve_rates(&config).await;

    match command {
        AppCommand::Metrics { json } => {
            let metrics = calculate_metrics(&config.snapshot, &display, &rates, date);
            cli::metrics::run(&metrics, json)?;
        }
        AppCommand::Obligations => {
            let obligations =
                expand_schedule(&config.snapshot.installments, &display, &rates, date);
            cli::obligations::run(&obligations, &display);
        }
        AppCommand::Project {
            contribution,
            starting_balance,
            months,
        } => {
            let starting_balance = match starting_balance.or(config.projection.starting_balance) {
                Some(balance) => balance,
                None => {
                    calculate_metrics(&config.snapshot, &display, &rates, date)
                        .assets
                        .cash
                }
            };
            let contribution = contribution.unwrap_or(config.projection.monthly_contribution);
            let months = months.unwrap_or(config.projection.months);

            let obligations =
                expand_schedule(&config.snapshot.installments, &display, &rates, date);
            let projection = project_cash_balance(
                starting_balance,
                contribution,
                &obligations,
                months,
                date,
            );
            cli::projection::run(starting_balance, &projection, &display);
        }
        AppCommand::Rates => cli::rates::run(&rates, &display),
    }
    Ok(())
}
