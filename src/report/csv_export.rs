use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::config::ReportConfig;
use crate::domain::WindowSpec;
use crate::models::Row;
use crate::report::format::{percent, price};

fn header(windows: &[WindowSpec]) -> Vec<String> {
    let mut columns = vec!["symbol".to_string(), "current".to_string()];
    for window in windows {
        for prefix in ["avg", "high", "low", "range"] {
            columns.push(format!("{}_{}", prefix, window.label));
        }
    }
    columns.extend(
        [
            "ever_high",
            "ever_low",
            "ever_avg",
            "signal",
            "best_buy",
            "best_sell",
            "stop_loss",
            "profit",
        ]
        .map(String::from),
    );
    columns
}

fn record(row: &Row, windows: &[WindowSpec], config: &ReportConfig) -> Vec<String> {
    let mut fields = vec![row.symbol.clone(), price(Some(row.current_price), config)];
    for window in windows {
        let stat = row.window(&window.label);
        fields.push(price(stat.and_then(|w| w.average), config));
        fields.push(price(stat.and_then(|w| w.high), config));
        fields.push(price(stat.and_then(|w| w.low), config));
        fields.push(percent(stat.and_then(|w| w.percent_range), config));
    }
    fields.push(price(Some(row.ever.high), config));
    fields.push(price(Some(row.ever.low), config));
    fields.push(price(Some(row.ever.average), config));
    fields.push(row.signal.to_string());
    fields.push(price(row.levels.best_buy, config));
    fields.push(price(row.levels.best_sell, config));
    fields.push(price(row.levels.stop_loss, config));
    fields.push(percent(row.levels.potential_profit_pct, config));
    fields
}

/// One record per row, window columns in the order given.
pub fn write_csv<W: Write>(
    writer: W,
    rows: &[Row],
    windows: &[WindowSpec],
    config: &ReportConfig,
) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(header(windows))?;
    for row in rows {
        wtr.write_record(record(row, windows, config))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn export_csv(
    path: impl AsRef<Path>,
    rows: &[Row],
    windows: &[WindowSpec],
    config: &ReportConfig,
) -> Result<()> {
    let path = path.as_ref();
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    write_csv(file, rows, windows, config)
        .with_context(|| format!("failed to write {}", path.display()))?;
    log::info!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::REPORT;
    use crate::models::{EverStat, Signal, TradeLevels, WindowStat};

    fn windows() -> Vec<WindowSpec> {
        vec![WindowSpec::new("24h", 96), WindowSpec::new("3M", 8640)]
    }

    fn row() -> Row {
        Row {
            symbol: "BTCUSDT".to_string(),
            current_price: 16.0,
            windows: vec![
                WindowStat {
                    label: "24h".to_string(),
                    length: 96,
                    average: Some(14.0),
                    high: Some(16.0),
                    low: Some(12.0),
                    percent_range: Some(100.0 / 3.0),
                },
                WindowStat::unavailable("3M", 8640),
            ],
            ever: EverStat {
                high: 16.0,
                low: 9.0,
                average: 12.2,
            },
            signal: Signal::NearHigh,
            levels: TradeLevels {
                best_buy: Some(12.0),
                best_sell: Some(16.0),
                stop_loss: Some(11.4),
                potential_profit_pct: Some(100.0 / 3.0),
            },
        }
    }

    fn render(rows: &[Row]) -> String {
        let mut buf = Vec::new();
        write_csv(&mut buf, rows, &windows(), &REPORT).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn header_order() {
        let out = render(&[]);
        assert_eq!(
            out.trim_end(),
            "symbol,current,avg_24h,high_24h,low_24h,range_24h,avg_3M,high_3M,low_3M,range_3M,\
             ever_high,ever_low,ever_avg,signal,best_buy,best_sell,stop_loss,profit"
        );
    }

    #[test]
    fn formats_values_and_sentinels() {
        let out = render(&[row()]);
        let line = out.lines().nth(1).unwrap();
        assert_eq!(
            line,
            "BTCUSDT,16.0000,14.0000,16.0000,12.0000,33.33%,-,-,-,-,\
             16.0000,9.0000,12.2000,NEAR HIGH,12.0000,16.0000,11.4000,33.33%"
        );
    }

    #[test]
    fn exports_to_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ranges.csv");
        export_csv(&path, &[row(), row()], &windows(), &REPORT).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 3);
        let unreachable = dir.path().join("no").join("such").join("dir.csv");
        assert!(export_csv(unreachable, &[row()], &windows(), &REPORT).is_err());
    }
}
