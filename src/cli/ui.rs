use crate::core::engine::ConversionView;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    Result,
    Error,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::Result => style(text).green().bold(),
        StyleType::Error => style(text).red(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Creates a styled header cell for a table.
pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

/// Creates a right-aligned numeric cell.
pub fn number_cell(text: String) -> Cell {
    Cell::new(text).set_alignment(CellAlignment::Right)
}

/// Creates a cell for "N/A" values.
pub fn na_cell() -> Cell {
    Cell::new("N/A")
        .fg(Color::DarkGrey)
        .set_alignment(CellAlignment::Right)
}

/// Spinner shown while a rate request is in flight.
pub fn new_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}")
    {
        pb.set_style(spinner_style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

pub fn format_converted(value: Option<f64>) -> String {
    value.map_or_else(|| "0.00".to_string(), |v| format!("{v:.2}"))
}

pub fn format_rate(value: Option<f64>) -> String {
    value.map_or_else(|| "0.000000".to_string(), |v| format!("{v:.6}"))
}

/// Renders the converter panel for the current engine state.
pub fn render_panel(view: &ConversionView) -> String {
    // The quote may still be for the previous pair while a refresh is pending,
    // so every figure is labelled with the pair it was computed for
    let (quoted, rate) = view
        .quote
        .map_or((view.pair, None), |q| (q.pair, Some(q.rate)));

    let mut table = new_styled_table();
    table.set_header(vec![
        header_cell(&format!("From ({})", quoted.source)),
        header_cell(&format!("To ({})", quoted.target)),
    ]);
    let result_cell = match view.converted {
        Some(v) => number_cell(format!("{v:.2}")).add_attribute(Attribute::Bold),
        None => Cell::new("Converted").fg(Color::DarkGrey),
    };
    table.add_row(vec![number_cell(view.amount_text.clone()), result_cell]);

    let status = if view.loading {
        format!("Refreshing... | Last updated {}", view.updated)
    } else {
        format!("Last updated {}", view.updated)
    };

    [
        style_text("Real-time FX Converter", StyleType::Title),
        table.to_string(),
        style_text(
            &format!("{} {}", quoted.target, format_converted(view.converted)),
            StyleType::Result,
        ),
        format!(
            "1 {} = {} {}",
            quoted.source,
            format_rate(rate),
            quoted.target
        ),
        style_text(&status, StyleType::Subtle),
        style_text(
            "Rate trend (24h): sparkline preview not available",
            StyleType::Subtle,
        ),
    ]
    .join("\n")
}

/// Prints a separator line matching the terminal width.
pub fn print_separator() {
    let term_width = console::Term::stdout()
        .size_checked()
        .map(|(_, w)| w as usize)
        .unwrap_or(80);
    println!("\n{}", "─".repeat(term_width));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::currency::{CurrencyCode, CurrencyPair};
    use crate::core::rates::Quote;

    fn view(converted: Option<f64>, rate: Option<f64>, loading: bool) -> ConversionView {
        let pair = CurrencyPair::new(CurrencyCode::Ksh, CurrencyCode::Usd);
        ConversionView {
            pair,
            amount_text: "10000".to_string(),
            converted,
            quote: rate.map(|rate| Quote { pair, rate }),
            loading,
            updated: "5s ago".to_string(),
        }
    }

    #[test]
    fn test_format_helpers() {
        assert_eq!(format_converted(Some(77.0)), "77.00");
        assert_eq!(format_converted(None), "0.00");
        assert_eq!(format_rate(Some(0.0077)), "0.007700");
        assert_eq!(format_rate(None), "0.000000");
    }

    #[test]
    fn test_panel_shows_conversion() {
        console::set_colors_enabled(false);
        let panel = render_panel(&view(Some(77.0), Some(0.0077), false));
        assert!(panel.contains("USD 77.00"));
        assert!(panel.contains("1 KSH = 0.007700 USD"));
        assert!(panel.contains("Last updated 5s ago"));
        assert!(!panel.contains("Refreshing"));
    }

    #[test]
    fn test_panel_before_first_rate() {
        console::set_colors_enabled(false);
        let panel = render_panel(&view(None, None, true));
        assert!(panel.contains("Converted"));
        assert!(panel.contains("USD 0.00"));
        assert!(panel.contains("1 KSH = 0.000000 USD"));
        assert!(panel.contains("Refreshing..."));
    }

    #[test]
    fn test_panel_labels_pending_pair_change_with_quoted_pair() {
        console::set_colors_enabled(false);
        let mut pending = view(Some(77.0), Some(0.0077), true);
        pending.pair = CurrencyPair::new(CurrencyCode::Ksh, CurrencyCode::Eur);

        let panel = render_panel(&pending);
        assert!(panel.contains("To (USD)"));
        assert!(!panel.contains("EUR"));
        assert!(panel.contains("USD 77.00"));
        assert!(panel.contains("Refreshing..."));
    }
}
