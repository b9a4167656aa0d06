use serde::{Deserialize, Serialize};

/// Summary of one look-back window. Every numeric field is `None` when the
/// series held fewer than `length` bars.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WindowStat {
    pub label: String,
    pub length: usize,
    /// Mean of closes
    pub average: Option<f64>,
    /// Max of highs
    pub high: Option<f64>,
    /// Min of lows
    pub low: Option<f64>,
    /// `(high - low) / low * 100`, None when low is zero
    pub percent_range: Option<f64>,
}

impl WindowStat {
    pub fn unavailable(label: impl Into<String>, length: usize) -> Self {
        Self {
            label: label.into(),
            length,
            average: None,
            high: None,
            low: None,
            percent_range: None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.high.is_some() && self.low.is_some()
    }
}

/// All-time reductions over the whole series. Always present because a row is
/// never built from an empty series.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct EverStat {
    pub high: f64,
    pub low: f64,
    pub average: f64,
}

/// Position of the current price inside a reference range.
#[derive(
    Serialize,
    Deserialize,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    strum_macros::Display,
    strum_macros::EnumIter,
)]
pub enum Signal {
    #[strum(to_string = "NEAR HIGH")]
    NearHigh,
    #[strum(to_string = "NEAR LOW")]
    NearLow,
    #[strum(to_string = "MID RANGE")]
    MidRange,
    #[default]
    #[strum(to_string = "N/A")]
    Unavailable,
}

/// Buy/sell levels derived from the window extremes.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct TradeLevels {
    pub best_buy: Option<f64>,
    pub best_sell: Option<f64>,
    pub stop_loss: Option<f64>,
    pub potential_profit_pct: Option<f64>,
}

/// One line of the dashboard.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Row {
    pub symbol: String,
    pub current_price: f64,
    /// In the order the windows were configured
    pub windows: Vec<WindowStat>,
    pub ever: EverStat,
    pub signal: Signal,
    pub levels: TradeLevels,
}

impl Row {
    pub fn window(&self, label: &str) -> Option<&WindowStat> {
        self.windows.iter().find(|w| w.label == label)
    }

    /// The window with the largest bar count; the first one wins a tie.
    pub fn widest_window(&self) -> Option<&WindowStat> {
        self.windows
            .iter()
            .reduce(|widest, w| if w.length > widest.length { w } else { widest })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    fn row_with(windows: Vec<WindowStat>) -> Row {
        Row {
            symbol: "ETHUSDT".to_string(),
            current_price: 1.0,
            windows,
            ever: EverStat {
                high: 1.0,
                low: 1.0,
                average: 1.0,
            },
            signal: Signal::default(),
            levels: TradeLevels::default(),
        }
    }

    #[test]
    fn signal_labels() {
        let labels: Vec<String> = Signal::iter().map(|s| s.to_string()).collect();
        assert_eq!(labels, ["NEAR HIGH", "NEAR LOW", "MID RANGE", "N/A"]);
    }

    #[test]
    fn widest_window_prefers_first_on_tie() {
        let row = row_with(vec![
            WindowStat::unavailable("24h", 96),
            WindowStat::unavailable("3m", 8640),
            WindowStat::unavailable("90d", 8640),
        ]);
        assert_eq!(row.widest_window().map(|w| w.label.as_str()), Some("3m"));
        assert!(row_with(vec![]).widest_window().is_none());
    }

    #[test]
    fn lookup_by_label() {
        let row = row_with(vec![WindowStat::unavailable("1w", 672)]);
        assert_eq!(row.window("1w").map(|w| w.length), Some(672));
        assert!(row.window("1m").is_none());
        assert!(!row.windows[0].is_available());
    }
}
