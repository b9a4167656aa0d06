//! Rolling-window statistics over one pair's bar history.
//!
//! Each window reduces the trailing `length` bars to the mean close, the
//! highest high and the lowest low, plus the swing between the two as a
//! percentage of the low. The same reductions over the whole series give the
//! all-time figures. Windows longer than the available history are reported as
//! unavailable rather than computed over a short slice.

use std::collections::HashSet;

use thiserror::Error;

use crate::domain::WindowSpec;
use crate::models::{EverStat, OhlcvSeries, Row, SeriesSlice, Signal, TradeLevels, WindowStat};
use crate::utils::maths_utils::{get_max, get_mean, get_min, percent_range};

#[derive(Debug, Error, PartialEq)]
pub enum StatsError {
    #[error("{0}: series has no bars")]
    EmptySeries(String),
    #[error("no windows configured")]
    NoWindows,
    #[error("window label '{0}' is used more than once")]
    DuplicateWindowLabel(String),
    #[error("window '{0}' has zero length")]
    ZeroLengthWindow(String),
    #[error("{0}: all-time statistics are not finite")]
    NonFiniteSeries(String),
}

/// Check a window set before any series is reduced against it.
pub fn validate_windows(windows: &[WindowSpec]) -> Result<(), StatsError> {
    if windows.is_empty() {
        return Err(StatsError::NoWindows);
    }
    let mut seen = HashSet::new();
    for window in windows {
        if window.length == 0 {
            return Err(StatsError::ZeroLengthWindow(window.label.clone()));
        }
        if !seen.insert(window.label.as_str()) {
            return Err(StatsError::DuplicateWindowLabel(window.label.clone()));
        }
    }
    Ok(())
}

/// Reduce a series to a row of window statistics.
///
/// The returned row carries `Signal::Unavailable` and empty trade levels; the
/// classifier fills those in. Output depends only on the inputs.
pub fn compute(series: &OhlcvSeries, windows: &[WindowSpec]) -> Result<Row, StatsError> {
    validate_windows(windows)?;

    let symbol = series.symbol().to_string();
    let last_bar = series
        .last_bar()
        .ok_or_else(|| StatsError::EmptySeries(symbol.clone()))?;

    let window_stats = windows
        .iter()
        .map(|spec| match series.tail(spec.length) {
            Some(slice) => reduce(&spec.label, spec.length, slice),
            None => WindowStat::unavailable(spec.label.clone(), spec.length),
        })
        .collect();

    let ever = reduce("ever", series.klines(), series.all());
    let ever = match (ever.high, ever.low, ever.average) {
        (Some(high), Some(low), Some(average)) => EverStat { high, low, average },
        _ => return Err(StatsError::NonFiniteSeries(symbol)),
    };

    Ok(Row {
        symbol,
        current_price: last_bar.close,
        windows: window_stats,
        ever,
        signal: Signal::Unavailable,
        levels: TradeLevels::default(),
    })
}

// Mean of closes, max of highs, min of lows.
fn reduce(label: &str, length: usize, slice: SeriesSlice<'_>) -> WindowStat {
    let average = get_mean(slice.close_prices);
    let high = get_max(slice.high_prices);
    let low = get_min(slice.low_prices);
    let percent_range = match (high, low) {
        (Some(high), Some(low)) => percent_range(high, low),
        _ => None,
    };

    WindowStat {
        label: label.to_string(),
        length,
        average,
        high,
        low,
        percent_range,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Bar, PairInterval};
    use crate::utils::TimeUtils;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn series_from_closes(closes: &[f64]) -> OhlcvSeries {
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar::new(i as i64 * TimeUtils::MS_IN_D, c, c, c, c, 100.0))
            .collect();
        OhlcvSeries::new(PairInterval::new("BTCUSDT", TimeUtils::MS_IN_D), bars).unwrap()
    }

    fn wicked_series() -> OhlcvSeries {
        // Highs and lows sit outside the closes so the reductions can be told apart
        let bars = (0..20)
            .map(|i| {
                let c = 100.0 + (i as f64 * 0.7).sin() * 10.0;
                Bar::new(i, c - 0.5, c + 2.0, c - 3.0, c, 10.0)
            })
            .collect();
        OhlcvSeries::new(PairInterval::new("SOLUSDT", TimeUtils::MS_IN_H), bars).unwrap()
    }

    #[test]
    fn ten_daily_closes_with_five_bar_window() {
        let series = series_from_closes(&[10., 11., 9., 12., 10., 13., 14., 12., 15., 16.]);
        let row = compute(&series, &[WindowSpec::new("5d", 5)]).unwrap();

        let w = &row.windows[0];
        assert!(approx_eq(w.average.unwrap(), 14.0));
        assert_eq!(w.high, Some(16.0));
        assert_eq!(w.low, Some(12.0));
        assert!(approx_eq(w.percent_range.unwrap(), 33.333_333_333));
        assert_eq!(row.current_price, 16.0);

        assert_eq!(row.ever.high, 16.0);
        assert_eq!(row.ever.low, 9.0);
        assert!(approx_eq(row.ever.average, 12.2));
    }

    #[test]
    fn uses_highs_for_max_lows_for_min_and_closes_for_mean() {
        let bars = vec![
            Bar::new(1, 10.0, 12.0, 8.0, 11.0, 1.0),
            Bar::new(2, 11.0, 15.0, 9.0, 13.0, 1.0),
        ];
        let series =
            OhlcvSeries::new(PairInterval::new("ETHUSDT", TimeUtils::MS_IN_H), bars).unwrap();
        let row = compute(&series, &[WindowSpec::new("2h", 2)]).unwrap();

        let w = &row.windows[0];
        assert_eq!(w.high, Some(15.0));
        assert_eq!(w.low, Some(8.0));
        assert!(approx_eq(w.average.unwrap(), 12.0));
        assert!(approx_eq(w.percent_range.unwrap(), 87.5));
    }

    #[test]
    fn window_extremes_bound_every_close() {
        let series = wicked_series();
        let windows: Vec<WindowSpec> = (1..=20)
            .map(|n| WindowSpec::new(format!("w{n}"), n))
            .collect();
        let row = compute(&series, &windows).unwrap();

        for (spec, stat) in windows.iter().zip(&row.windows) {
            let closes = series.tail(spec.length).unwrap().close_prices;
            let high = stat.high.unwrap();
            let low = stat.low.unwrap();
            assert!(closes.iter().all(|&c| high >= c && low <= c), "{}", spec.label);
        }
    }

    #[test]
    fn short_history_marks_every_field_unavailable() {
        let series = series_from_closes(&[1.0, 2.0, 3.0]);
        let row = compute(
            &series,
            &[WindowSpec::new("3b", 3), WindowSpec::new("4b", 4)],
        )
        .unwrap();

        assert!(row.windows[0].is_available());
        assert_eq!(row.windows[1], WindowStat::unavailable("4b", 4));
        // All-time figures do not depend on window availability
        assert_eq!(row.ever.high, 3.0);
        assert_eq!(row.ever.low, 1.0);
    }

    #[test]
    fn repeated_calls_are_identical() {
        let series = wicked_series();
        let windows = [WindowSpec::new("5", 5), WindowSpec::new("50", 50)];
        assert_eq!(
            compute(&series, &windows).unwrap(),
            compute(&series, &windows).unwrap()
        );
    }

    #[test]
    fn ever_extremes_only_move_when_a_new_bar_breaks_them() {
        let series = wicked_series();
        let windows = [WindowSpec::new("5", 5)];
        let before = compute(&series, &windows).unwrap().ever;

        let mid = (before.high + before.low) / 2.0;
        let inside = Bar::new(1_000, mid, mid + 0.1, mid - 0.1, mid, 1.0);
        let after = compute(&series.with_appended(inside).unwrap(), &windows)
            .unwrap()
            .ever;
        assert_eq!(after.high, before.high);
        assert_eq!(after.low, before.low);

        let breakout = Bar::new(1_000, mid, before.high + 5.0, before.low - 5.0, mid, 1.0);
        let after = compute(&series.with_appended(breakout).unwrap(), &windows)
            .unwrap()
            .ever;
        assert_eq!(after.high, before.high + 5.0);
        assert_eq!(after.low, before.low - 5.0);
    }

    #[test]
    fn zero_low_leaves_percent_range_unavailable() {
        let bars = vec![
            Bar::new(1, 0.0, 1.0, 0.0, 0.5, 1.0),
            Bar::new(2, 0.5, 2.0, 0.1, 1.5, 1.0),
        ];
        let series =
            OhlcvSeries::new(PairInterval::new("NEWUSDT", TimeUtils::MS_IN_H), bars).unwrap();
        let row = compute(&series, &[WindowSpec::new("2", 2)]).unwrap();

        let w = &row.windows[0];
        assert_eq!(w.low, Some(0.0));
        assert_eq!(w.high, Some(2.0));
        assert_eq!(w.percent_range, None);
    }

    #[test]
    fn rejects_bad_inputs() {
        let empty =
            OhlcvSeries::new(PairInterval::new("BTCUSDT", TimeUtils::MS_IN_H), vec![]).unwrap();
        assert_eq!(
            compute(&empty, &[WindowSpec::new("1", 1)]),
            Err(StatsError::EmptySeries("BTCUSDT".to_string()))
        );

        let series = series_from_closes(&[1.0]);
        assert_eq!(compute(&series, &[]), Err(StatsError::NoWindows));
        assert_eq!(
            compute(&series, &[WindowSpec::new("a", 1), WindowSpec::new("a", 2)]),
            Err(StatsError::DuplicateWindowLabel("a".to_string()))
        );
        assert_eq!(
            compute(&series, &[WindowSpec::new("z", 0)]),
            Err(StatsError::ZeroLengthWindow("z".to_string()))
        );
    }
}
