use super::ui;
use crate::core::currency::CurrencyCode;
use crate::core::projection::{MonthProjection, ProjectionSummary};
use comfy_table::{Cell, Color};

/// Renders a month-by-month cash projection followed by its summary.
///
/// Months whose ending balance is negative are highlighted.
pub fn render(
    starting_balance: f64,
    projection: &[MonthProjection],
    currency: &CurrencyCode,
) -> String {
    let currency = currency.as_str();
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Month"),
        ui::header_cell("Contribution"),
        ui::header_cell("Obligations"),
        ui::header_cell(&format!("Ending balance ({currency})")),
    ]);

    for month in projection {
        let label = Cell::new(month.month.format("%Y-%m"));
        let label = if month.is_shortfall {
            label.fg(Color::Red)
        } else {
            label
        };
        table.add_row(vec![
            label,
            ui::amount_cell(month.contribution_applied),
            ui::amount_cell(month.obligations_total),
            ui::signed_amount_cell(month.ending_balance),
        ]);
    }

    let summary = ProjectionSummary::from_projection(starting_balance, projection);
    let mut lines = vec![
        format!(
            "{}: {}",
            ui::style_text("Starting balance", ui::StyleType::TotalLabel),
            ui::format_money(starting_balance, currency)
        ),
        format!(
            "{}: {}",
            ui::style_text("Total obligations", ui::StyleType::TotalLabel),
            ui::format_money(summary.total_obligations, currency)
        ),
        ui::headline("Final balance", summary.final_balance, currency),
    ];
    if let Some(month) = summary.lowest_month {
        lines.push(format!(
            "{}: {} in {}",
            ui::style_text("Lowest balance", ui::StyleType::TotalLabel),
            ui::format_money(summary.lowest_balance, currency),
            month.format("%Y-%m")
        ));
    }
    lines.push(match summary.first_shortfall {
        Some(month) => ui::style_text(
            &format!("First shortfall in {}", month.format("%Y-%m")),
            ui::StyleType::Negative,
        ),
        None => ui::style_text(
            &format!("No shortfall within {} months", projection.len()),
            ui::StyleType::Positive,
        ),
    });

    format!(
        "{}\n\n{}\n\n{}",
        ui::style_text("Cash projection", ui::StyleType::Title),
        table,
        lines.join("\n")
    )
}

pub fn run(starting_balance: f64, projection: &[MonthProjection], currency: &CurrencyCode) {
    println!("{}", render(starting_balance, projection, currency));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::projection::{Obligation, project_cash_balance};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_render_with_shortfall() {
        let obligations = vec![Obligation {
            date: date(2025, 2, 10),
            amount: 5_000.0,
            label: "Villa".to_string(),
            plan: "Villa".to_string(),
        }];
        let projection = project_cash_balance(1_000.0, 500.0, &obligations, 3, date(2025, 1, 20));
        let output = console::strip_ansi_codes(&render(
            1_000.0,
            &projection,
            &"USD".parse().unwrap(),
        ))
        .to_string();

        assert!(output.contains("Cash projection"));
        assert!(output.contains("2025-01"));
        assert!(output.contains("-3,000.00"));
        assert!(output.contains("Starting balance: 1,000.00 USD"));
        assert!(output.contains("Total obligations: 5,000.00 USD"));
        assert!(output.contains("Final balance: -2,500.00 USD"));
        assert!(output.contains("First shortfall in 2025-02"));
    }

    #[test]
    fn test_render_without_shortfall() {
        let projection = project_cash_balance(1_000.0, 100.0, &[], 2, date(2025, 1, 1));
        let output = console::strip_ansi_codes(&render(
            1_000.0,
            &projection,
            &"EGP".parse().unwrap(),
        ))
        .to_string();

        assert!(output.contains("Final balance: 1,200.00 EGP"));
        assert!(output.contains("No shortfall within 2 months"));
    }
}
