use super::ui;
use crate::core::{CurrencyCode, RateProvider, RateTable};
use anyhow::{Context, Result};
use comfy_table::Table;

/// Builds a table of `base → code` rates for every supported currency.
pub fn rates_table(table: &RateTable) -> Table {
    let mut out = ui::new_styled_table();
    out.set_header(vec![
        ui::header_cell("Currency"),
        ui::header_cell(&format!("1 {} =", table.base)),
        ui::header_cell(&format!("Per {}", table.base)),
    ]);

    for code in CurrencyCode::ALL {
        let row = match table.rate_for(code) {
            Some(rate) => vec![
                comfy_table::Cell::new(code.as_str()),
                ui::number_cell(format!("{rate:.6}")),
                ui::number_cell(format!("{:.6}", 1.0 / rate)),
            ],
            None => vec![comfy_table::Cell::new(code.as_str()), ui::na_cell(), ui::na_cell()],
        };
        out.add_row(row);
    }
    out
}

pub async fn run(provider: &dyn RateProvider, base: CurrencyCode) -> Result<()> {
    let pb = ui::new_spinner(&format!("Fetching {base} rates..."));
    let result = provider.latest(base).await;
    pb.finish_and_clear();

    let table = result.with_context(|| format!("Failed to fetch rates for {base}"))?;
    println!(
        "\nRates for {}",
        ui::style_text(base.as_str(), ui::StyleType::Title)
    );
    println!("{}", rates_table(&table));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_rates_table_lists_every_currency() {
        let table = RateTable {
            base: CurrencyCode::Usd,
            rates: HashMap::from([("USD".to_string(), 1.0), ("EUR".to_string(), 0.5)]),
        };

        let rendered = rates_table(&table).to_string();
        for code in CurrencyCode::ALL {
            assert!(rendered.contains(code.as_str()), "missing {code}");
        }
        assert!(rendered.contains("0.500000"));
        assert!(rendered.contains("2.000000"));
        assert!(rendered.contains("N/A"));
    }
}
