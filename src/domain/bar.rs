use serde::{Deserialize, Serialize};

/// One OHLCV candle, keyed by its open time.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    pub timestamp_ms: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    pub fn new(timestamp_ms: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Bar {
            timestamp_ms,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Prices and volume are finite and non-negative, and open and close sit
    /// inside `[low, high]`.
    pub fn is_sane(&self) -> bool {
        let values_ok = [self.open, self.high, self.low, self.close, self.volume]
            .iter()
            .all(|v| v.is_finite() && *v >= 0.0);
        values_ok
            && self.low <= self.open.min(self.close)
            && self.high >= self.open.max(self.close)
    }
}
