use super::ui;
use crate::core::currency::{CurrencyCode, RateTable, TROY_OUNCE_GRAMS, Unit, convert};
use comfy_table::{Cell, CellAlignment};

/// Renders the rate table in use, with commodity prices in the display currency.
pub fn render(rates: &RateTable, display: &CurrencyCode) -> String {
    let mut codes: Vec<&CurrencyCode> = rates.rates.keys().collect();
    codes.sort();

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Currency"),
        ui::header_cell("Per USD"),
        ui::header_cell(&format!("In {display}")),
    ]);
    for code in codes {
        let unit = Unit::from(code);
        table.add_row(vec![
            Cell::new(code),
            Cell::new(format!("{:.4}", rates.rate(code))).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.4}", convert(1.0, &unit, display, rates)))
                .set_alignment(CellAlignment::Right),
        ]);
    }

    let mut metals = ui::new_styled_table();
    metals.set_header(vec![
        ui::header_cell("Metal"),
        ui::header_cell("Spot (USD/oz)"),
        ui::header_cell(&format!("Per ounce ({display})")),
        ui::header_cell(&format!("Per gram ({display})")),
    ]);
    for (name, unit, spot) in [
        ("Gold", Unit::GoldGram, rates.gold_spot()),
        ("Silver", Unit::SilverGram, rates.silver_spot()),
    ] {
        metals.add_row(vec![
            Cell::new(name),
            ui::amount_cell(spot),
            ui::amount_cell(convert(TROY_OUNCE_GRAMS, &unit, display, rates)),
            ui::amount_cell(convert(1.0, &unit, display, rates)),
        ]);
    }

    format!(
        "{}\n\n{}\n\n{}",
        ui::style_text("Exchange rates", ui::StyleType::Title),
        table,
        metals
    )
}

pub fn run(rates: &RateTable, display: &CurrencyCode) {
    println!("{}", render(rates, display));
}
