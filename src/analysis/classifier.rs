use serde::{Deserialize, Serialize};

use crate::config::ANALYSIS;
use crate::models::{Row, Signal, TradeLevels};
use crate::utils::maths_utils::{finite, percent_range};

/// Which high/low pair the current price is measured against.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub enum RangeReference {
    /// The window with the most bars
    #[default]
    Widest,
    /// A window picked by label
    Window(String),
    /// The whole series
    Ever,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Classifier {
    pub reference: RangeReference,
    /// Fraction of the reference high/low that still counts as "near" (0.05 = 5%)
    pub near_threshold: f64,
    /// Fraction below the best buy level where the stop loss sits
    pub stop_loss_fraction: f64,
}

impl Default for Classifier {
    fn default() -> Self {
        Self {
            reference: RangeReference::Widest,
            near_threshold: ANALYSIS.signal.near_threshold,
            stop_loss_fraction: ANALYSIS.signal.stop_loss_fraction,
        }
    }
}

impl Classifier {
    /// Fill in the signal and trade levels of a freshly computed row.
    pub fn apply(&self, mut row: Row) -> Row {
        row.signal = self.classify(&row);
        row.levels = trade_levels(&row, self.stop_loss_fraction);
        row
    }

    pub fn classify(&self, row: &Row) -> Signal {
        let bounds = match &self.reference {
            RangeReference::Widest => row.widest_window().and_then(|w| w.high.zip(w.low)),
            RangeReference::Window(label) => row.window(label).and_then(|w| w.high.zip(w.low)),
            RangeReference::Ever => Some((row.ever.high, row.ever.low)),
        };
        match bounds {
            Some((high, low)) => signal_for(row.current_price, high, low, self.near_threshold),
            None => Signal::Unavailable,
        }
    }
}

/// Classify against the widest window of the row.
pub fn classify(row: &Row, near_threshold: f64) -> Signal {
    Classifier {
        near_threshold,
        ..Classifier::default()
    }
    .classify(row)
}

/// Where `price` sits inside `[low, high]`.
///
/// When the range is so narrow that both the near-high and the near-low test
/// pass, `NearHigh` is returned.
pub fn signal_for(price: f64, high: f64, low: f64, near_threshold: f64) -> Signal {
    if price >= (1.0 - near_threshold) * high {
        Signal::NearHigh
    } else if price <= (1.0 + near_threshold) * low {
        Signal::NearLow
    } else {
        Signal::MidRange
    }
}

/// Lowest window low as the buy level, highest window high as the sell level.
/// Unavailable windows are ignored; with none available every level is `None`.
pub fn trade_levels(row: &Row, stop_loss_fraction: f64) -> TradeLevels {
    let best_buy = row
        .windows
        .iter()
        .filter_map(|w| w.low)
        .reduce(f64::min);
    let best_sell = row
        .windows
        .iter()
        .filter_map(|w| w.high)
        .reduce(f64::max);

    let stop_loss = best_buy.and_then(|buy| finite(buy * (1.0 - stop_loss_fraction)));
    let potential_profit_pct = match (best_sell, best_buy) {
        (Some(sell), Some(buy)) => percent_range(sell, buy),
        _ => None,
    };

    TradeLevels {
        best_buy,
        best_sell,
        stop_loss,
        potential_profit_pct,
    }
}
