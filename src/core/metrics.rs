//! Provides functions for deriving net worth and cash-flow metrics from a
//! [`FinancialSnapshot`].
use crate::core::currency::{CurrencyCode, RateTable, Unit, convert, sum_amounts};
use crate::core::snapshot::{FinancialSnapshot, InstallmentPlan};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AssetTotals {
    pub real_estate: f64,
    pub under_development: f64,
    pub cash: f64,
    pub gold: f64,
    pub silver: f64,
    pub other: f64,
    pub total: f64,
}

impl AssetTotals {
    /// Category subtotals in display order.
    pub fn categories(&self) -> [(&'static str, f64); 6] {
        [
            ("Real estate", self.real_estate),
            ("Under development", self.under_development),
            ("Cash", self.cash),
            ("Gold", self.gold),
            ("Silver", self.silver),
            ("Other", self.other),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LiabilityTotals {
    pub loans: f64,
    pub installments: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IncomeTotals {
    pub salary: f64,
    pub rent: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExpenseTotals {
    pub loans: f64,
    pub household: f64,
    pub installments: f64,
    pub total: f64,
    /// Household expenses grouped by their category label.
    pub household_by_category: BTreeMap<String, f64>,
}

/// Monthly figures and balances, all in `currency`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metrics {
    pub currency: CurrencyCode,
    pub assets: AssetTotals,
    pub liabilities: LiabilityTotals,
    pub income: IncomeTotals,
    pub expenses: ExpenseTotals,
    pub net_worth: f64,
    pub net_cash_flow: f64,
    /// Salary minus loan payments and household expenses. Rent and
    /// installments are left out on purpose.
    pub operating_cash_flow: f64,
}

impl Metrics {
    /// Metrics of a household with no data.
    pub fn zero(currency: &CurrencyCode) -> Self {
        Self {
            currency: currency.clone(),
            assets: AssetTotals::default(),
            liabilities: LiabilityTotals::default(),
            income: IncomeTotals::default(),
            expenses: ExpenseTotals::default(),
            net_worth: 0.0,
            net_cash_flow: 0.0,
            operating_cash_flow: 0.0,
        }
    }

    /// Share of total assets held in each category, in percent.
    pub fn asset_allocation(&self) -> Vec<(&'static str, f64)> {
        let total = self.assets.total;
        self.assets
            .categories()
            .into_iter()
            .map(|(name, value)| {
                let share = if total > 0.0 { value / total * 100.0 } else { 0.0 };
                (name, share)
            })
            .collect()
    }

    pub fn debt_to_asset_ratio(&self) -> f64 {
        if self.assets.total > 0.0 {
            self.liabilities.total / self.assets.total
        } else {
            0.0
        }
    }
}

fn sum_converted<T>(
    items: &[T],
    target: &CurrencyCode,
    rates: &RateTable,
    amount: impl Fn(&T) -> (f64, Unit),
) -> f64 {
    sum_amounts(items.iter().map(|item| {
        let (value, unit) = amount(item);
        convert(value, &unit, target, rates)
    }))
}

fn unit_of(currency: &Option<CurrencyCode>, target: &CurrencyCode) -> Unit {
    Unit::Currency(currency.clone().unwrap_or_else(|| target.clone()))
}

/// Average monthly amount a plan costs.
///
/// With a schedule, only entries due in the reference date's calendar year are
/// counted and spread over twelve months. Without one, the next installment is
/// annualized by its frequency.
pub fn average_monthly_burden(plan: &InstallmentPlan, reference_date: NaiveDate) -> f64 {
    match plan.full_schedule() {
        Some(schedule) => {
            let this_year = sum_amounts(
                schedule
                    .iter()
                    .filter(|entry| entry.date.year() == reference_date.year())
                    .map(|entry| entry.amount),
            );
            this_year / 12.0
        }
        None => plan.next_amount * plan.frequency.payments_per_year() / 12.0,
    }
}

/// Calculates net worth and monthly cash flow for a household.
///
/// All amounts are converted into `target`. The computation never fails: a
/// snapshot without assets yields [`Metrics::zero`], and missing rates are
/// treated as 1.
pub fn calculate_metrics(
    snapshot: &FinancialSnapshot,
    target: &CurrencyCode,
    rates: &RateTable,
    reference_date: NaiveDate,
) -> Metrics {
    let Some(assets) = snapshot.assets.as_ref() else {
        debug!("Snapshot has no assets section, returning empty metrics");
        return Metrics::zero(target);
    };

    let mut asset_totals = AssetTotals {
        real_estate: sum_converted(&assets.real_estate, target, rates, |p| {
            (p.value, unit_of(&p.currency, target))
        }),
        under_development: sum_converted(&assets.under_development, target, rates, |p| {
            (p.value, unit_of(&p.currency, target))
        }),
        cash: sum_converted(&assets.cash, target, rates, |c| {
            (c.amount, unit_of(&c.currency, target))
        }),
        gold: sum_converted(&assets.gold, target, rates, |g| (g.grams, Unit::GoldGram)),
        silver: sum_converted(&assets.silver, target, rates, |s| (s.grams, Unit::SilverGram)),
        other: sum_converted(&assets.other, target, rates, |o| {
            (o.value, unit_of(&o.currency, target))
        }),
        total: 0.0,
    };
    asset_totals.total = sum_amounts(asset_totals.categories().map(|(_, value)| value));
    debug!("Total assets in {target}: {}", asset_totals.total);

    let loans_outstanding = sum_converted(&snapshot.loans, target, rates, |l| {
        (l.remaining, unit_of(&l.currency, target))
    });
    let installments_outstanding = sum_converted(&snapshot.installments, target, rates, |i| {
        (i.outstanding(), unit_of(&i.currency, target))
    });
    let liabilities = LiabilityTotals {
        loans: loans_outstanding,
        installments: installments_outstanding,
        total: loans_outstanding + installments_outstanding,
    };

    let salary = snapshot.salary.as_ref().map_or(0.0, |s| {
        convert(s.amount, &unit_of(&s.currency, target), target, rates)
    });
    let rent = sum_converted(&assets.real_estate, target, rates, |p| {
        (p.monthly_rent_equivalent(), unit_of(&p.currency, target))
    });
    let income = IncomeTotals {
        salary,
        rent,
        total: salary + rent,
    };

    let loan_payments = sum_converted(&snapshot.loans, target, rates, |l| {
        (l.monthly_payment, unit_of(&l.currency, target))
    });
    let mut household_by_category: BTreeMap<String, f64> = BTreeMap::new();
    for expense in &snapshot.expenses {
        let value = convert(
            expense.amount,
            &unit_of(&expense.currency, target),
            target,
            rates,
        );
        let category = expense
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or("Other");
        *household_by_category.entry(category.to_string()).or_default() += value;
    }
    let household = sum_amounts(household_by_category.values().copied());
    let installment_burden = sum_converted(&snapshot.installments, target, rates, |plan| {
        (
            average_monthly_burden(plan, reference_date),
            unit_of(&plan.currency, target),
        )
    });
    let expenses = ExpenseTotals {
        loans: loan_payments,
        household,
        installments: installment_burden,
        total: loan_payments + household + installment_burden,
        household_by_category,
    };

    let net_worth = asset_totals.total - liabilities.total;
    let net_cash_flow = income.total - expenses.total;
    let operating_cash_flow = income.salary - (expenses.loans + expenses.household);
    debug!(
        "Net worth {net_worth}, net cash flow {net_cash_flow}, operating cash flow {operating_cash_flow}"
    );

    Metrics {
        currency: target.clone(),
        assets: asset_totals,
        liabilities,
        income,
        expenses,
        net_worth,
        net_cash_flow,
        operating_cash_flow,
    }
}
