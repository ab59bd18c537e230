//! Household financial data as entered by the user.
//!
//! Input comes from hand-edited files and loosely typed forms, so numeric
//! fields accept numbers, numeric strings or nothing at all. Anything that
//! does not read as a finite number is treated as zero.

use crate::core::currency::{CurrencyCode, finite_or_zero};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

mod lenient {
    use super::*;
    use tracing::warn;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
        Other(serde::de::IgnoredAny),
    }

    pub fn number<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = match Option::<Raw>::deserialize(deserializer)? {
            Some(Raw::Number(n)) => n,
            Some(Raw::Text(s)) => s.trim().replace(',', "").parse().unwrap_or(0.0),
            Some(Raw::Other(_)) | None => 0.0,
        };
        Ok(finite_or_zero(value))
    }

    fn parse_date(text: &str) -> Option<NaiveDate> {
        let parsed = NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok();
        if parsed.is_none() {
            warn!("Ignoring unreadable date: {:?}", text);
        }
        parsed
    }

    /// Reads an optional `YYYY-MM-DD` date. Unreadable dates read as none.
    pub fn date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Raw>::deserialize(deserializer)? {
            Some(Raw::Text(text)) => parse_date(&text),
            Some(Raw::Number(n)) => parse_date(&n.to_string()),
            Some(Raw::Other(_)) | None => None,
        })
    }

    #[derive(Deserialize)]
    struct RawScheduleEntry {
        #[serde(default, deserialize_with = "date")]
        date: Option<NaiveDate>,
        #[serde(default, deserialize_with = "number")]
        amount: f64,
        #[serde(default)]
        description: String,
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawScheduleItem {
        Entry(RawScheduleEntry),
        Other(serde::de::IgnoredAny),
    }

    /// Reads a payment schedule, dropping entries without a readable date.
    pub fn schedule<'de, D>(deserializer: D) -> Result<Option<Vec<ScheduleEntry>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let Some(items) = Option::<Vec<RawScheduleItem>>::deserialize(deserializer)? else {
            return Ok(None);
        };
        let entries = items
            .into_iter()
            .filter_map(|item| match item {
                RawScheduleItem::Entry(RawScheduleEntry {
                    date: Some(date),
                    amount,
                    description,
                }) => Some(ScheduleEntry {
                    date,
                    amount,
                    description,
                }),
                _ => {
                    warn!("Dropping schedule entry without a readable date");
                    None
                }
            })
            .collect();
        Ok(Some(entries))
    }
}

/// How often a payment or rent is due.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", rename_all = "kebab-case")]
pub enum Frequency {
    #[default]
    Monthly,
    Quarterly,
    SemiAnnual,
    Annual,
    OneTime,
}

impl FromStr for Frequency {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        match normalized.as_str() {
            "monthly" | "month" => Ok(Frequency::Monthly),
            "quarterly" | "quarter" => Ok(Frequency::Quarterly),
            "semiannual" | "semiannually" | "biannual" => Ok(Frequency::SemiAnnual),
            "annual" | "annually" | "yearly" | "year" => Ok(Frequency::Annual),
            "onetime" | "once" | "single" => Ok(Frequency::OneTime),
            _ => Err(anyhow::anyhow!("Invalid frequency: {}", s)),
        }
    }
}

impl From<String> for Frequency {
    fn from(s: String) -> Self {
        s.parse().unwrap_or_default()
    }
}

impl Frequency {
    /// Number of months one period covers. One-time payments have no period.
    pub fn months_per_period(&self) -> Option<f64> {
        match self {
            Frequency::Monthly => Some(1.0),
            Frequency::Quarterly => Some(3.0),
            Frequency::SemiAnnual => Some(6.0),
            Frequency::Annual => Some(12.0),
            Frequency::OneTime => None,
        }
    }

    /// Number of payments in a year.
    pub fn payments_per_year(&self) -> f64 {
        match self {
            Frequency::Monthly => 12.0,
            Frequency::Quarterly => 4.0,
            Frequency::SemiAnnual => 2.0,
            Frequency::Annual => 1.0,
            Frequency::OneTime => 0.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Property {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::number")]
    pub value: f64,
    pub currency: Option<CurrencyCode>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub monthly_rent: f64,
    #[serde(default)]
    pub rent_frequency: Frequency,
}

impl Property {
    /// Rent expressed per month. Rent entered as one-time is not recurring income.
    pub fn monthly_rent_equivalent(&self) -> f64 {
        self.rent_frequency
            .months_per_period()
            .filter(|months| *months > 0.0)
            .map_or(0.0, |months| self.monthly_rent / months)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CashHolding {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::number")]
    pub amount: f64,
    pub currency: Option<CurrencyCode>,
}

/// Gold or silver held by weight.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetalHolding {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::number")]
    pub grams: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OtherAsset {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::number")]
    pub value: f64,
    pub currency: Option<CurrencyCode>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Assets {
    #[serde(default)]
    pub real_estate: Vec<Property>,
    #[serde(default)]
    pub under_development: Vec<Property>,
    #[serde(default)]
    pub cash: Vec<CashHolding>,
    #[serde(default)]
    pub gold: Vec<MetalHolding>,
    #[serde(default)]
    pub silver: Vec<MetalHolding>,
    #[serde(default)]
    pub other: Vec<OtherAsset>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Salary {
    #[serde(default, deserialize_with = "lenient::number")]
    pub amount: f64,
    pub currency: Option<CurrencyCode>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BankLoan {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::number")]
    pub principal: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub remaining: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub monthly_payment: f64,
    pub currency: Option<CurrencyCode>,
}

/// One contractual payment of an installment plan, paid or not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub date: NaiveDate,
    #[serde(default, deserialize_with = "lenient::number")]
    pub amount: f64,
    #[serde(default)]
    pub description: String,
}

/// A purchase paid off in installments, e.g. an off-plan apartment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstallmentPlan {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::number")]
    pub total: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub paid: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub next_amount: f64,
    #[serde(default, deserialize_with = "lenient::date")]
    pub next_due_date: Option<NaiveDate>,
    #[serde(default)]
    pub frequency: Frequency,
    pub currency: Option<CurrencyCode>,
    #[serde(default, deserialize_with = "lenient::schedule")]
    pub schedule: Option<Vec<ScheduleEntry>>,
}

impl InstallmentPlan {
    /// Outstanding principal, not a cash-flow figure.
    pub fn outstanding(&self) -> f64 {
        self.total - self.paid
    }

    /// The schedule, when one with at least one entry was provided.
    pub fn full_schedule(&self) -> Option<&[ScheduleEntry]> {
        self.schedule.as_deref().filter(|entries| !entries.is_empty())
    }

    pub fn has_schedule(&self) -> bool {
        self.full_schedule().is_some()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HouseholdExpense {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub amount: f64,
    pub currency: Option<CurrencyCode>,
}

/// Everything known about a household's finances at one point in time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FinancialSnapshot {
    pub assets: Option<Assets>,
    pub salary: Option<Salary>,
    #[serde(default)]
    pub loans: Vec<BankLoan>,
    #[serde(default)]
    pub installments: Vec<InstallmentPlan>,
    #[serde(default)]
    pub expenses: Vec<HouseholdExpense>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lenient_numbers() {
        let yaml = r#"
- name: "number"
  amount: 1500.5
- name: "text"
  amount: " 2,000 "
- name: "garbage"
  amount: "n/a"
- name: "null"
  amount: ~
- name: "missing"
- name: "list"
  amount: [1, 2]
"#;
        let holdings: Vec<CashHolding> = serde_yaml::from_str(yaml).unwrap();
        let amounts: Vec<f64> = holdings.iter().map(|h| h.amount).collect();
        assert_eq!(amounts, vec![1500.5, 2000.0, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_frequency_parsing() {
        assert_eq!(Frequency::from("semi-annual".to_string()), Frequency::SemiAnnual);
        assert_eq!(Frequency::from("Semi_Annual".to_string()), Frequency::SemiAnnual);
        assert_eq!(Frequency::from("yearly".to_string()), Frequency::Annual);
        assert_eq!(Frequency::from("one-time".to_string()), Frequency::OneTime);
        assert_eq!(Frequency::from("fortnightly".to_string()), Frequency::Monthly);
        assert!("fortnightly".parse::<Frequency>().is_err());
    }

    #[test]
    fn test_monthly_rent_equivalent() {
        let mut property = Property {
            monthly_rent: 1200.0,
            rent_frequency: Frequency::Annual,
            ..Default::default()
        };
        assert_eq!(property.monthly_rent_equivalent(), 100.0);
        property.rent_frequency = Frequency::Quarterly;
        assert_eq!(property.monthly_rent_equivalent(), 400.0);
        property.rent_frequency = Frequency::SemiAnnual;
        assert_eq!(property.monthly_rent_equivalent(), 200.0);
        property.rent_frequency = Frequency::Monthly;
        assert_eq!(property.monthly_rent_equivalent(), 1200.0);
        property.rent_frequency = Frequency::OneTime;
        assert_eq!(property.monthly_rent_equivalent(), 0.0);
    }

    #[test]
    fn test_empty_schedule_is_not_a_schedule() {
        let mut plan = InstallmentPlan {
            total: 100_000.0,
            paid: 40_000.0,
            schedule: Some(Vec::new()),
            ..Default::default()
        };
        assert_eq!(plan.outstanding(), 60_000.0);
        assert!(!plan.has_schedule());

        plan.schedule = Some(vec![ScheduleEntry {
            date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            amount: 5000.0,
            description: "Down payment".to_string(),
        }]);
        assert!(plan.has_schedule());
    }

    #[test]
    fn test_unreadable_dates_do_not_reject_the_plan() {
        let yaml = r#"
name: "Villa"
total: 900000
next_due_date: "sometime in March"
schedule:
  - date: 2025-03-01
    amount: "150,000"
    description: "Q1"
  - date: 2025-13-45
    amount: 150000
  - amount: 150000
  - "not an entry"
  - date: " 2025-09-01 "
    amount: 150000
"#;
        let plan: InstallmentPlan = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(plan.total, 900_000.0);
        assert!(plan.next_due_date.is_none());

        let schedule = plan.full_schedule().unwrap();
        let dates: Vec<NaiveDate> = schedule.iter().map(|e| e.date).collect();
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
                NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
            ]
        );
        assert_eq!(schedule[0].amount, 150_000.0);
        assert_eq!(schedule[0].description, "Q1");
    }

    #[test]
    fn test_schedule_of_unreadable_dates_is_no_schedule() {
        let yaml = r#"
name: "Car"
next_amount: 2000
next_due_date: 2025-02-01
schedule:
  - date: "soon"
    amount: 2000
"#;
        let plan: InstallmentPlan = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(plan.next_due_date, NaiveDate::from_ymd_opt(2025, 2, 1));
        assert_eq!(plan.schedule.as_ref().map(Vec::len), Some(0));
        assert!(!plan.has_schedule());
    }

    #[test]
    fn test_snapshot_without_assets() {
        let snapshot: FinancialSnapshot = serde_yaml::from_str("loans: []").unwrap();
        assert!(snapshot.assets.is_none());
        assert!(snapshot.salary.is_none());
        assert!(snapshot.installments.is_empty());
    }
}
