use super::ui;
use crate::core::currency::{CurrencyCode, sum_amounts};
use crate::core::projection::Obligation;
use comfy_table::Cell;

/// Renders upcoming scheduled installments as a table with a total row.
pub fn render(obligations: &[Obligation], currency: &CurrencyCode) -> String {
    if obligations.is_empty() {
        return ui::style_text("No upcoming installments", ui::StyleType::Subtle);
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Date"),
        ui::header_cell("Plan"),
        ui::header_cell("Description"),
        ui::header_cell(&format!("Amount ({currency})")),
    ]);

    for obligation in obligations {
        let description = obligation
            .label
            .strip_prefix(&format!("{}: ", obligation.plan))
            .unwrap_or("");
        table.add_row(vec![
            Cell::new(obligation.date.format("%Y-%m-%d")),
            Cell::new(&obligation.plan),
            Cell::new(description),
            ui::amount_cell(obligation.amount),
        ]);
    }

    let total = sum_amounts(obligations.iter().map(|o| o.amount));
    table.add_row(vec![
        Cell::new(ui::style_text("Total", ui::StyleType::TotalLabel)),
        Cell::new(""),
        Cell::new(format!("{} payments", obligations.len())),
        ui::total_cell(total),
    ]);

    format!(
        "{}\n\n{}",
        ui::style_text("Upcoming installments", ui::StyleType::Title),
        table
    )
}

pub fn run(obligations: &[Obligation], currency: &CurrencyCode) {
    println!("{}", render(obligations, currency));
}
