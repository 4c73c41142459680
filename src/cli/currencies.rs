use super::ui;
use crate::core::{CurrencyPair, CurrencySelector};
use comfy_table::{Cell, Table};

pub fn currencies_table(pair: CurrencyPair) -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Code"),
        ui::header_cell("From"),
        ui::header_cell("To"),
    ]);

    let from = CurrencySelector::new(pair.source).options();
    let to = CurrencySelector::new(pair.target).options();
    for (source, target) in from.iter().zip(to.iter()) {
        let mark = |selected: bool| Cell::new(if selected { "*" } else { "" });
        table.add_row(vec![
            Cell::new(source.code.as_str()),
            mark(source.selected),
            mark(target.selected),
        ]);
    }
    table
}

pub fn run(pair: CurrencyPair) -> anyhow::Result<()> {
    println!("{}", currencies_table(pair));
    Ok(())
}
