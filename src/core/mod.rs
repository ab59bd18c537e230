//! Core business logic: conversion, aggregation and projection

pub mod cache;
pub mod config;
pub mod currency;
pub mod log;
pub mod metrics;
pub mod projection;
pub mod snapshot;

// Re-export main types for cleaner imports
pub use currency::{CurrencyCode, RateTable, RateTableProvider, Unit, convert};
pub use metrics::{Metrics, calculate_metrics};
pub use projection::{
    DEFAULT_HORIZON_MONTHS, MonthProjection, Obligation, ProjectionSummary, expand_schedule,
    first_shortfall, project_cash_balance,
};
pub use snapshot::FinancialSnapshot;
