use crate::config::ReportConfig;
use crate::domain::WindowSpec;
use crate::models::Row;
use crate::report::format::{percent, price};

const SYMBOL_WIDTH: usize = 12;
const VALUE_WIDTH: usize = 14;
const SIGNAL_WIDTH: usize = 10;

/// Fixed-width text, one line per row. Each window shows its percent range;
/// the full figures are in the CSV export.
pub fn render_table(rows: &[Row], windows: &[WindowSpec], config: &ReportConfig) -> String {
    let mut out = format!("{:<SYMBOL_WIDTH$}{:>VALUE_WIDTH$}", "SYMBOL", "PRICE");
    for window in windows {
        out.push_str(&format!("{:>VALUE_WIDTH$}", format!("RANGE {}", window.label)));
    }
    out.push_str(&levels_columns(["SIGNAL", "BUY", "SELL", "STOP", "PROFIT"]));

    for row in rows {
        out.push_str(&format!(
            "{:<SYMBOL_WIDTH$}{:>VALUE_WIDTH$}",
            row.symbol,
            price(Some(row.current_price), config)
        ));
        for window in windows {
            let pct = row.window(&window.label).and_then(|w| w.percent_range);
            out.push_str(&format!("{:>VALUE_WIDTH$}", percent(pct, config)));
        }
        out.push_str(&levels_columns([
            row.signal.to_string(),
            price(row.levels.best_buy, config),
            price(row.levels.best_sell, config),
            price(row.levels.stop_loss, config),
            percent(row.levels.potential_profit_pct, config),
        ]));
    }
    out
}

// Signal then the four trade levels, ending the line.
fn levels_columns<S: AsRef<str>>([signal, buy, sell, stop, profit]: [S; 5]) -> String {
    format!(
        "  {:<SIGNAL_WIDTH$}{:>VALUE_WIDTH$}{:>VALUE_WIDTH$}{:>VALUE_WIDTH$}{:>VALUE_WIDTH$}\n",
        signal.as_ref(),
        buy.as_ref(),
        sell.as_ref(),
        stop.as_ref(),
        profit.as_ref()
    )
}
