use super::ui;
use crate::core::metrics::Metrics;
use anyhow::Result;
use comfy_table::Cell;

impl Metrics {
    fn assets_table(&self) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Asset"),
            ui::header_cell(&format!("Value ({})", self.currency)),
            ui::header_cell("Share"),
        ]);
        for ((name, value), (_, share)) in self
            .assets
            .categories()
            .into_iter()
            .zip(self.asset_allocation())
        {
            table.add_row(vec![
                Cell::new(name),
                ui::amount_cell(value),
                ui::percentage_cell(share),
            ]);
        }
        table.add_row(vec![
            Cell::new(ui::style_text("Total assets", ui::StyleType::TotalLabel)),
            ui::total_cell(self.assets.total),
            Cell::new(""),
        ]);
        table.to_string()
    }

    fn liabilities_table(&self) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Liability"),
            ui::header_cell(&format!("Outstanding ({})", self.currency)),
        ]);
        table.add_row(vec![
            Cell::new("Bank loans"),
            ui::amount_cell(self.liabilities.loans),
        ]);
        table.add_row(vec![
            Cell::new("Installments"),
            ui::amount_cell(self.liabilities.installments),
        ]);
        table.add_row(vec![
            Cell::new(ui::style_text("Total liabilities", ui::StyleType::TotalLabel)),
            ui::total_cell(self.liabilities.total),
        ]);
        table.to_string()
    }

    fn cash_flow_table(&self) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Monthly"),
            ui::header_cell("Source"),
            ui::header_cell(&format!("Amount ({})", self.currency)),
        ]);
        table.add_row(vec![
            Cell::new("Income"),
            Cell::new("Salary"),
            ui::amount_cell(self.income.salary),
        ]);
        table.add_row(vec![
            Cell::new(""),
            Cell::new("Rent"),
            ui::amount_cell(self.income.rent),
        ]);
        table.add_row(vec![
            Cell::new(""),
            Cell::new(ui::style_text("Total income", ui::StyleType::TotalLabel)),
            ui::total_cell(self.income.total),
        ]);

        table.add_row(vec![
            Cell::new("Expenses"),
            Cell::new("Loan payments"),
            ui::amount_cell(self.expenses.loans),
        ]);
        for (category, amount) in &self.expenses.household_by_category {
            table.add_row(vec![
                Cell::new(""),
                Cell::new(ui::style_text(
                    &format!("Household: {category}"),
                    ui::StyleType::Subtle,
                )),
                ui::amount_cell(*amount),
            ]);
        }
        table.add_row(vec![
            Cell::new(""),
            Cell::new("Household"),
            ui::amount_cell(self.expenses.household),
        ]);
        table.add_row(vec![
            Cell::new(""),
            Cell::new("Installments (average)"),
            ui::amount_cell(self.expenses.installments),
        ]);
        table.add_row(vec![
            Cell::new(""),
            Cell::new(ui::style_text("Total expenses", ui::StyleType::TotalLabel)),
            ui::total_cell(self.expenses.total),
        ]);
        table.to_string()
    }

    /// Renders the full dashboard: balance sheet, cash flow and headline figures.
    pub fn display_as_tables(&self) -> String {
        let currency = self.currency.as_str();
        let mut output = format!(
            "{}\n\n{}\n\n{}\n\n",
            ui::style_text("Balance sheet", ui::StyleType::Title),
            self.assets_table(),
            self.liabilities_table()
        );
        output.push_str(&format!(
            "{}\n\n{}\n\n",
            ui::style_text("Cash flow", ui::StyleType::Title),
            self.cash_flow_table()
        ));

        let headlines = [
            ui::headline("Net worth", self.net_worth, currency),
            ui::headline("Net cash flow", self.net_cash_flow, currency),
            ui::headline("Operating cash flow", self.operating_cash_flow, currency),
        ];
        output.push_str(&headlines.join("\n"));
        output.push_str(&format!(
            "\n{}: {:.2}%",
            ui::style_text("Debt to assets", ui::StyleType::TotalLabel),
            self.debt_to_asset_ratio() * 100.0
        ));
        output
    }
}

pub fn run(metrics: &Metrics, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(metrics)?);
    } else {
        println!("{}", metrics.display_as_tables());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::currency::RateTable;
    use crate::core::metrics::calculate_metrics;
    use crate::core::snapshot::{Assets, CashHolding, FinancialSnapshot, HouseholdExpense, Salary};
    use chrono::NaiveDate;

    fn sample_metrics() -> Metrics {
        let snapshot = FinancialSnapshot {
            assets: Some(Assets {
                cash: vec![CashHolding {
                    name: "Savings".to_string(),
                    amount: 25_000.0,
                    currency: None,
                }],
                ..Default::default()
            }),
            salary: Some(Salary {
                amount: 4_000.0,
                currency: None,
            }),
            expenses: vec![HouseholdExpense {
                name: "Rent".to_string(),
                category: Some("Housing".to_string()),
                amount: 1_500.0,
                currency: None,
            }],
            ..Default::default()
        };
        calculate_metrics(
            &snapshot,
            &"USD".parse().unwrap(),
            &RateTable::new(),
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        )
    }

    #[test]
    fn test_display_as_tables() {
        let output = console::strip_ansi_codes(&sample_metrics().display_as_tables()).to_string();
        assert!(output.contains("Balance sheet"));
        assert!(output.contains("Value (USD)"));
        assert!(output.contains("25,000.00"));
        assert!(output.contains("100.00%"));
        assert!(output.contains("Household: Housing"));
        assert!(output.contains("Net worth: 25,000.00 USD"));
        assert!(output.contains("Net cash flow: 2,500.00 USD"));
        assert!(output.contains("Operating cash flow: 2,500.00 USD"));
        assert!(output.contains("Debt to assets: 0.00%"));
    }

    #[test]
    fn test_run_outputs_json() {
        assert!(run(&sample_metrics(), true).is_ok());
        let json = serde_json::to_value(sample_metrics()).unwrap();
        assert_eq!(json["currency"], "USD");
        assert_eq!(json["assets"]["cash"], 25_000.0);
        assert_eq!(json["expenses"]["household_by_category"]["Housing"], 1_500.0);
    }
}
