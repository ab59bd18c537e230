//! Forward-looking view of installment obligations and the cash balance
//! that has to cover them.
use crate::core::currency::{CurrencyCode, RateTable, Unit, convert, finite_or_zero, sum_amounts};
use crate::core::snapshot::InstallmentPlan;
use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;
use tracing::debug;

/// Months simulated when the caller does not choose a horizon.
pub const DEFAULT_HORIZON_MONTHS: u32 = 24;

/// A single future payment, already converted to the display currency.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Obligation {
    pub date: NaiveDate,
    pub amount: f64,
    pub label: String,
    pub plan: String,
}

/// State of the simulated balance at the end of one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthProjection {
    /// First day of the month.
    pub month: NaiveDate,
    pub contribution_applied: f64,
    pub obligations_this_month: Vec<Obligation>,
    pub obligations_total: f64,
    pub ending_balance: f64,
    pub is_shortfall: bool,
}

fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn same_month(a: NaiveDate, b: NaiveDate) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

/// Lists every scheduled installment due on or after `reference_date`.
///
/// Only plans with a full schedule take part; their schedule supersedes the
/// next-due fields. The result is sorted by date, and payments due on the
/// same day keep the order of their plans.
pub fn expand_schedule(
    plans: &[InstallmentPlan],
    display: &CurrencyCode,
    rates: &RateTable,
    reference_date: NaiveDate,
) -> Vec<Obligation> {
    let mut obligations: Vec<Obligation> = plans
        .iter()
        .filter_map(|plan| plan.full_schedule().map(|schedule| (plan, schedule)))
        .flat_map(|(plan, schedule)| {
            let unit = Unit::Currency(plan.currency.clone().unwrap_or_else(|| display.clone()));
            schedule
                .iter()
                .filter(move |entry| entry.date >= reference_date)
                .map(move |entry| Obligation {
                    date: entry.date,
                    amount: convert(entry.amount, &unit, display, rates),
                    label: if entry.description.trim().is_empty() {
                        plan.name.clone()
                    } else {
                        format!("{}: {}", plan.name, entry.description.trim())
                    },
                    plan: plan.name.clone(),
                })
        })
        .collect();

    // sort_by_key is stable
    obligations.sort_by_key(|obligation| obligation.date);
    debug!(
        "Expanded {} upcoming obligations from {} plans",
        obligations.len(),
        plans.len()
    );
    obligations
}

/// Simulates the cash balance month by month.
///
/// Each month first receives `monthly_contribution`, then pays every
/// obligation dated within that calendar month. The first month is the one
/// containing `reference_date`. Negative contributions are allowed and model
/// planned withdrawals.
pub fn project_cash_balance(
    starting_balance: f64,
    monthly_contribution: f64,
    obligations: &[Obligation],
    months: u32,
    reference_date: NaiveDate,
) -> Vec<MonthProjection> {
    let contribution = finite_or_zero(monthly_contribution);
    let mut balance = finite_or_zero(starting_balance);
    let first_month = month_start(reference_date);

    (0..months)
        .map_while(|offset| first_month.checked_add_months(Months::new(offset)))
        .map(|month| {
            let due: Vec<Obligation> = obligations
                .iter()
                .filter(|obligation| same_month(obligation.date, month))
                .cloned()
                .collect();
            let obligations_total = sum_amounts(due.iter().map(|o| finite_or_zero(o.amount)));
            balance += contribution;
            balance -= obligations_total;

            MonthProjection {
                month,
                contribution_applied: contribution,
                obligations_this_month: due,
                obligations_total,
                ending_balance: balance,
                is_shortfall: balance < 0.0,
            }
        })
        .collect()
}

/// First month, in simulation order, whose balance went negative.
pub fn first_shortfall(projection: &[MonthProjection]) -> Option<&MonthProjection> {
    projection.iter().find(|month| month.is_shortfall)
}

/// Headline numbers of a projection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectionSummary {
    pub lowest_balance: f64,
    pub lowest_month: Option<NaiveDate>,
    pub total_obligations: f64,
    pub final_balance: f64,
    pub first_shortfall: Option<NaiveDate>,
}

impl ProjectionSummary {
    pub fn from_projection(starting_balance: f64, projection: &[MonthProjection]) -> Self {
        let lowest = projection
            .iter()
            .min_by(|a, b| a.ending_balance.total_cmp(&b.ending_balance));
        Self {
            lowest_balance: lowest.map_or(finite_or_zero(starting_balance), |m| m.ending_balance),
            lowest_month: lowest.map(|m| m.month),
            total_obligations: sum_amounts(projection.iter().map(|m| m.obligations_total)),
            final_balance: projection
                .last()
                .map_or(finite_or_zero(starting_balance), |m| m.ending_balance),
            first_shortfall: first_shortfall(projection).map(|m| m.month),
        }
    }
}
