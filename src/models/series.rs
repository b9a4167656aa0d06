use itertools::Itertools;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Bar, PairInterval};

// ============================================================================
// OhlcvSeries: validated, immutable bar history for one pair
// ============================================================================

/// Column-oriented so window reductions can run straight over contiguous slices.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct OhlcvSeries {
    pair_interval: PairInterval,
    timestamps_ms: Vec<i64>,
    open_prices: Vec<f64>,
    high_prices: Vec<f64>,
    low_prices: Vec<f64>,
    close_prices: Vec<f64>,
    volumes: Vec<f64>,
}

#[derive(Debug, Error, PartialEq)]
pub enum SeriesError {
    #[error("{pair}: bar at {timestamp_ms} is not after the previous bar at {previous_ms}")]
    NotAscending {
        pair: String,
        previous_ms: i64,
        timestamp_ms: i64,
    },
    #[error("{pair}: bar at {timestamp_ms} has a negative or non-finite value, or open/close outside high/low")]
    InvalidBar { pair: String, timestamp_ms: i64 },
}

/// A borrowed window of a series. All slices have the same length.
#[derive(Debug, Clone, Copy)]
pub struct SeriesSlice<'a> {
    pub high_prices: &'a [f64],
    pub low_prices: &'a [f64],
    pub close_prices: &'a [f64],
}

impl SeriesSlice<'_> {
    pub fn len(&self) -> usize {
        self.close_prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.close_prices.is_empty()
    }
}

impl OhlcvSeries {
    /// Validates ordering and values. An empty bar list is accepted here; the
    /// statistics engine is the one that refuses to reduce it.
    pub fn new(pair_interval: PairInterval, bars: Vec<Bar>) -> Result<Self, SeriesError> {
        if let Some((prev, next)) = bars
            .iter()
            .tuple_windows()
            .find(|(prev, next)| next.timestamp_ms <= prev.timestamp_ms)
        {
            return Err(SeriesError::NotAscending {
                pair: pair_interval.name.clone(),
                previous_ms: prev.timestamp_ms,
                timestamp_ms: next.timestamp_ms,
            });
        }
        if let Some(bad) = bars.iter().find(|bar| !bar.is_sane()) {
            return Err(SeriesError::InvalidBar {
                pair: pair_interval.name.clone(),
                timestamp_ms: bad.timestamp_ms,
            });
        }

        let n = bars.len();
        let mut series = OhlcvSeries {
            pair_interval,
            timestamps_ms: Vec::with_capacity(n),
            open_prices: Vec::with_capacity(n),
            high_prices: Vec::with_capacity(n),
            low_prices: Vec::with_capacity(n),
            close_prices: Vec::with_capacity(n),
            volumes: Vec::with_capacity(n),
        };
        for bar in bars {
            series.timestamps_ms.push(bar.timestamp_ms);
            series.open_prices.push(bar.open);
            series.high_prices.push(bar.high);
            series.low_prices.push(bar.low);
            series.close_prices.push(bar.close);
            series.volumes.push(bar.volume);
        }
        Ok(series)
    }

    pub fn pair_interval(&self) -> &PairInterval {
        &self.pair_interval
    }

    pub fn symbol(&self) -> &str {
        self.pair_interval.name()
    }

    pub fn klines(&self) -> usize {
        self.close_prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.close_prices.is_empty()
    }

    pub fn get_bar(&self, idx: usize) -> Option<Bar> {
        (idx < self.klines()).then(|| {
            Bar::new(
                self.timestamps_ms[idx],
                self.open_prices[idx],
                self.high_prices[idx],
                self.low_prices[idx],
                self.close_prices[idx],
                self.volumes[idx],
            )
        })
    }

    pub fn last_bar(&self) -> Option<Bar> {
        self.klines().checked_sub(1).and_then(|idx| self.get_bar(idx))
    }

    pub fn first_kline_timestamp_ms(&self) -> Option<i64> {
        self.timestamps_ms.first().copied()
    }

    pub fn last_kline_timestamp_ms(&self) -> Option<i64> {
        self.timestamps_ms.last().copied()
    }

    /// The trailing `count` bars, or `None` when the series is shorter than that.
    /// Never returns a short slice.
    pub fn tail(&self, count: usize) -> Option<SeriesSlice<'_>> {
        let total = self.klines();
        if count > total {
            return None;
        }
        Some(self.slice(total - count, total))
    }

    pub fn all(&self) -> SeriesSlice<'_> {
        self.slice(0, self.klines())
    }

    fn slice(&self, start: usize, end: usize) -> SeriesSlice<'_> {
        SeriesSlice {
            high_prices: &self.high_prices[start..end],
            low_prices: &self.low_prices[start..end],
            close_prices: &self.close_prices[start..end],
        }
    }

    /// A copy with one more bar at the end. Used to model a refresh adding a candle.
    pub fn with_appended(&self, bar: Bar) -> Result<Self, SeriesError> {
        let mut bars: Vec<Bar> = (0..self.klines()).filter_map(|i| self.get_bar(i)).collect();
        bars.push(bar);
        Self::new(self.pair_interval.clone(), bars)
    }
}
