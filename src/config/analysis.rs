//! Analysis and computation configuration

use crate::utils::TimeUtils;

/// Thresholds used when turning window statistics into a signal
pub struct SignalSettings {
    // Fraction of the reference high/low that counts as "near" it (0.05 = 5%)
    pub near_threshold: f64,
    // Stop loss sits this fraction below the best buy level
    pub stop_loss_fraction: f64,
}

/// The Master Analysis Configuration
pub struct AnalysisConfig {
    // Candle interval fetched for every pair (1h, 5m, 15m, etc.)
    pub interval_width_ms: i64,
    // Look-back windows as Binance-style durations. The shorthand doubles as the label.
    // `M` is a 30-day month, `m` is a minute.
    pub windows: &'static [&'static str],
    // Seconds between two dashboard passes
    pub refresh_secs: u64,

    pub signal: SignalSettings,
}

pub const ANALYSIS: AnalysisConfig = AnalysisConfig {
    interval_width_ms: TimeUtils::MS_IN_15_MIN,
    windows: &["24h", "1w", "1M", "3M"],
    refresh_secs: 300, // 5 minutes

    signal: SignalSettings {
        near_threshold: 0.05,
        stop_loss_fraction: 0.05,
    },
};
