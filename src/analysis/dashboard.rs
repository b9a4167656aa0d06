//! One dashboard pass: fetch every symbol, reduce each series to a row, sort.
//!
//! Fetching is sequential so the exchange sees one request at a time. The
//! reductions are pure and run as a parallel map once every series is in.

use std::cmp::Ordering;
use std::str::FromStr;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::time::Instant;

#[cfg(debug_assertions)]
use crate::config::debug::PRINT_ROW_SUMMARY;
use crate::analysis::classifier::Classifier;
use crate::analysis::window_stats::{self, StatsError};
use crate::data::BarSource;
use crate::domain::{PairInterval, WindowSpec};
use crate::models::{OhlcvSeries, Row};
#[cfg(debug_assertions)]
use crate::utils::time_utils;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedSymbol {
    pub symbol: String,
    pub reason: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NoData {
    #[error("the symbol list is empty")]
    EmptySymbolList,
    #[error("no symbol produced a row ({} skipped)", .skipped.len())]
    EmptyResultSet { skipped: Vec<SkippedSymbol> },
}

#[derive(Debug, Clone, Serialize)]
pub struct PassReport {
    pub rows: Vec<Row>,
    pub skipped: Vec<SkippedSymbol>,
}

/// Row ordering for presentation. Unavailable values always go last.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Symbol-list order
    #[default]
    AsProduced,
    /// Symbol ascending
    Symbol,
    /// Current price descending
    Price,
    /// Percent range of the labelled window, descending
    Range(String),
    /// Potential profit descending
    Profit,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown sort key '{0}' (expected produced, symbol, price, profit or range:<label>)")]
pub struct SortKeyError(String);

impl FromStr for SortKey {
    type Err = SortKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(label) = s.strip_prefix("range:") {
            if label.is_empty() {
                return Err(SortKeyError(s.to_string()));
            }
            return Ok(SortKey::Range(label.to_string()));
        }
        match s.to_ascii_lowercase().as_str() {
            "produced" => Ok(SortKey::AsProduced),
            "symbol" => Ok(SortKey::Symbol),
            "price" => Ok(SortKey::Price),
            "profit" => Ok(SortKey::Profit),
            _ => Err(SortKeyError(s.to_string())),
        }
    }
}

// Larger first, None after every Some.
fn descending(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Stable sort, so equal keys keep their produced order.
pub fn sort_rows(rows: &mut [Row], key: &SortKey) {
    match key {
        SortKey::AsProduced => {}
        SortKey::Symbol => rows.sort_by(|a, b| a.symbol.cmp(&b.symbol)),
        SortKey::Price => {
            rows.sort_by(|a, b| descending(Some(a.current_price), Some(b.current_price)))
        }
        SortKey::Range(label) => rows.sort_by(|a, b| {
            descending(
                a.window(label).and_then(|w| w.percent_range),
                b.window(label).and_then(|w| w.percent_range),
            )
        }),
        SortKey::Profit => rows.sort_by(|a, b| {
            descending(
                a.levels.potential_profit_pct,
                b.levels.potential_profit_pct,
            )
        }),
    }
}

#[derive(Debug, Clone)]
pub struct PassSettings {
    pub interval_ms: i64,
    pub windows: Vec<WindowSpec>,
    /// Bars requested per symbol
    pub max_bars: usize,
    pub classifier: Classifier,
    pub sort: SortKey,
}

impl PassSettings {
    /// Requests exactly enough bars to fill the longest window.
    pub fn new(interval_ms: i64, windows: Vec<WindowSpec>) -> Self {
        let max_bars = windows.iter().map(|w| w.length).max().unwrap_or(1).max(1);
        Self {
            interval_ms,
            windows,
            max_bars,
            classifier: Classifier::default(),
            sort: SortKey::default(),
        }
    }
}

/// Window statistics plus signal and trade levels for one series.
pub fn build_row(
    series: &OhlcvSeries,
    windows: &[WindowSpec],
    classifier: &Classifier,
) -> Result<Row, StatsError> {
    let row = classifier.apply(window_stats::compute(series, windows)?);

    #[cfg(debug_assertions)]
    if PRINT_ROW_SUMMARY {
        log::info!(
            "{}: {} bars from {} to {}, price {} -> {} (ever {}..{})",
            series.pair_interval(),
            series.klines(),
            series
                .first_kline_timestamp_ms()
                .map_or_else(String::new, time_utils::epoch_ms_to_utc),
            series
                .last_kline_timestamp_ms()
                .map_or_else(String::new, time_utils::epoch_ms_to_utc),
            row.current_price,
            row.signal,
            row.ever.low,
            row.ever.high
        );
    }
    Ok(row)
}

pub async fn run_pass<S>(
    source: &S,
    symbols: &[String],
    settings: &PassSettings,
) -> Result<PassReport, NoData>
where
    S: BarSource + ?Sized,
{
    if symbols.is_empty() {
        return Err(NoData::EmptySymbolList);
    }
    let start_time = Instant::now();
    let mut skipped = Vec::new();
    let mut fetched = Vec::with_capacity(symbols.len());

    for symbol in symbols {
        let pair_interval = PairInterval::new(symbol.as_str(), settings.interval_ms);
        match source.fetch_series(&pair_interval, settings.max_bars).await {
            Ok(series) => fetched.push(series),
            Err(e) => {
                if e.is_transient() {
                    log::warn!("Skipping {} for this pass: {}", pair_interval, e);
                } else {
                    log::warn!("Skipping {}: {}", pair_interval, e);
                }
                skipped.push(SkippedSymbol {
                    symbol: symbol.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    let results: Vec<Result<Row, (String, StatsError)>> = fetched
        .into_par_iter()
        .map(|series| {
            build_row(&series, &settings.windows, &settings.classifier)
                .map_err(|e| (series.symbol().to_string(), e))
        })
        .collect();

    let mut rows = Vec::with_capacity(results.len());
    for result in results {
        match result {
            Ok(row) => rows.push(row),
            Err((symbol, e)) => {
                log::warn!("Skipping {}: {}", symbol, e);
                skipped.push(SkippedSymbol {
                    symbol,
                    reason: e.to_string(),
                });
            }
        }
    }

    if rows.is_empty() {
        return Err(NoData::EmptyResultSet { skipped });
    }
    sort_rows(&mut rows, &settings.sort);

    log::info!(
        "Pass via {} produced {} rows ({} skipped) in {:?}",
        source.signature(),
        rows.len(),
        skipped.len(),
        start_time.elapsed()
    );
    Ok(PassReport { rows, skipped })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::data::FetchError;
    use crate::domain::Bar;
    use crate::models::{EverStat, Signal, TradeLevels, WindowStat};
    use crate::utils::TimeUtils;

    #[derive(Default)]
    struct MemorySource {
        closes: HashMap<String, Vec<f64>>,
        transient: Vec<String>,
        requests: Mutex<Vec<(String, usize)>>,
    }

    impl MemorySource {
        fn with(mut self, symbol: &str, closes: &[f64]) -> Self {
            self.closes.insert(symbol.to_string(), closes.to_vec());
            self
        }

        fn flaky(mut self, symbol: &str) -> Self {
            self.transient.push(symbol.to_string());
            self
        }
    }

    #[async_trait]
    impl BarSource for MemorySource {
        async fn fetch_series(
            &self,
            pair_interval: &PairInterval,
            max_bars: usize,
        ) -> Result<OhlcvSeries, FetchError> {
            let name = pair_interval.name().to_string();
            self.requests.lock().unwrap().push((name.clone(), max_bars));
            if self.transient.contains(&name) {
                return Err(FetchError::Transient(format!("{name}: timed out")));
            }
            let closes = self
                .closes
                .get(&name)
                .ok_or_else(|| FetchError::NoData(format!("{name}: unknown symbol")))?;
            let start = closes.len().saturating_sub(max_bars);
            let bars = closes[start..]
                .iter()
                .enumerate()
                .map(|(i, &c)| Bar::new(i as i64 * pair_interval.interval_ms, c, c, c, c, 1.0))
                .collect();
            OhlcvSeries::new(pair_interval.clone(), bars)
                .map_err(|e| FetchError::Transient(e.to_string()))
        }

        fn signature(&self) -> &'static str {
            "Memory"
        }
    }

    fn settings() -> PassSettings {
        PassSettings::new(
            TimeUtils::MS_IN_D,
            vec![WindowSpec::new("3d", 3), WindowSpec::new("5d", 5)],
        )
    }

    fn symbols(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn row(symbol: &str, price: f64, range: Option<f64>, profit: Option<f64>) -> Row {
        let mut window = WindowStat::unavailable("1w", 672);
        window.percent_range = range;
        Row {
            symbol: symbol.to_string(),
            current_price: price,
            windows: vec![window],
            ever: EverStat {
                high: price,
                low: price,
                average: price,
            },
            signal: Signal::Unavailable,
            levels: TradeLevels {
                potential_profit_pct: profit,
                ..TradeLevels::default()
            },
        }
    }

    fn order(rows: &[Row]) -> Vec<&str> {
        rows.iter().map(|r| r.symbol.as_str()).collect()
    }

    #[tokio::test]
    async fn empty_symbol_list_is_no_data() {
        let source = MemorySource::default();
        assert_eq!(
            run_pass(&source, &[], &settings()).await.unwrap_err(),
            NoData::EmptySymbolList
        );
        assert!(source.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failing_symbols_are_skipped_and_order_is_kept() {
        let source = MemorySource::default()
            .with("ETHUSDT", &[1.0, 2.0, 3.0, 4.0, 5.0])
            .with("BTCUSDT", &[10., 11., 9., 12., 10., 13., 14., 12., 15., 16.])
            .flaky("SOLUSDT");
        let list = symbols(&["ETHUSDT", "NOPEUSDT", "SOLUSDT", "BTCUSDT"]);

        let report = run_pass(&source, &list, &settings()).await.unwrap();

        assert_eq!(order(&report.rows), ["ETHUSDT", "BTCUSDT"]);
        let skipped: Vec<&str> = report.skipped.iter().map(|s| s.symbol.as_str()).collect();
        assert_eq!(skipped, ["NOPEUSDT", "SOLUSDT"]);

        // One request per symbol, none retried, each sized for the longest window
        let requests = source.requests.lock().unwrap();
        assert_eq!(requests.len(), 4);
        assert!(requests.iter().all(|(_, max_bars)| *max_bars == 5));

        let btc = &report.rows[1];
        assert_eq!(btc.current_price, 16.0);
        assert_eq!(btc.window("5d").and_then(|w| w.high), Some(16.0));
        assert_eq!(btc.window("5d").and_then(|w| w.low), Some(12.0));
        assert_eq!(btc.signal, Signal::NearHigh);
        assert_eq!(btc.levels.best_buy, Some(12.0));
    }

    #[tokio::test]
    async fn all_symbols_failing_is_an_empty_result_set() {
        let source = MemorySource::default().flaky("SOLUSDT");
        let err = run_pass(&source, &symbols(&["SOLUSDT", "NOPEUSDT"]), &settings())
            .await
            .unwrap_err();
        match err {
            NoData::EmptyResultSet { skipped } => assert_eq!(skipped.len(), 2),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn short_history_still_produces_a_row() {
        let source = MemorySource::default().with("NEWUSDT", &[1.0, 2.0, 3.0]);
        let report = run_pass(&source, &symbols(&["NEWUSDT"]), &settings())
            .await
            .unwrap();
        let row = &report.rows[0];
        assert!(row.window("3d").is_some_and(|w| w.is_available()));
        assert!(row.window("5d").is_some_and(|w| !w.is_available()));
        // The widest window is unavailable, so there is no signal
        assert_eq!(row.signal, Signal::Unavailable);
    }

    #[tokio::test]
    async fn pass_applies_the_sort_key() {
        let source = MemorySource::default()
            .with("AAAUSDT", &[1.0, 1.0, 1.0])
            .with("BBBUSDT", &[5.0, 5.0, 5.0]);
        let mut settings = settings();
        settings.sort = SortKey::Price;
        let report = run_pass(&source, &symbols(&["AAAUSDT", "BBBUSDT"]), &settings)
            .await
            .unwrap();
        assert_eq!(order(&report.rows), ["BBBUSDT", "AAAUSDT"]);
    }

    #[test]
    fn sort_keys_put_unavailable_last() {
        let rows = vec![
            row("CCC", 3.0, None, Some(10.0)),
            row("AAA", 1.0, Some(50.0), None),
            row("BBB", 2.0, Some(80.0), Some(30.0)),
        ];

        let mut by_symbol = rows.clone();
        sort_rows(&mut by_symbol, &SortKey::Symbol);
        assert_eq!(order(&by_symbol), ["AAA", "BBB", "CCC"]);

        let mut by_price = rows.clone();
        sort_rows(&mut by_price, &SortKey::Price);
        assert_eq!(order(&by_price), ["CCC", "BBB", "AAA"]);

        let mut by_range = rows.clone();
        sort_rows(&mut by_range, &SortKey::Range("1w".to_string()));
        assert_eq!(order(&by_range), ["BBB", "AAA", "CCC"]);

        let mut by_profit = rows.clone();
        sort_rows(&mut by_profit, &SortKey::Profit);
        assert_eq!(order(&by_profit), ["BBB", "CCC", "AAA"]);

        let mut produced = rows.clone();
        sort_rows(&mut produced, &SortKey::AsProduced);
        assert_eq!(order(&produced), ["CCC", "AAA", "BBB"]);
    }

    #[test]
    fn parses_sort_keys() {
        assert_eq!("produced".parse::<SortKey>(), Ok(SortKey::AsProduced));
        assert_eq!("Symbol".parse::<SortKey>(), Ok(SortKey::Symbol));
        assert_eq!("price".parse::<SortKey>(), Ok(SortKey::Price));
        assert_eq!("profit".parse::<SortKey>(), Ok(SortKey::Profit));
        assert_eq!("range:1w".parse::<SortKey>(), Ok(SortKey::Range("1w".to_string())));
        assert!("range:".parse::<SortKey>().is_err());
        assert!("volume".parse::<SortKey>().is_err());
    }

    #[test]
    fn max_bars_follows_the_longest_window() {
        let settings = PassSettings::new(
            TimeUtils::MS_IN_15_MIN,
            vec![WindowSpec::new("24h", 96), WindowSpec::new("3M", 8640)],
        );
        assert_eq!(settings.max_bars, 8640);
    }
}
