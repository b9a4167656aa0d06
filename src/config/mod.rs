//! Configuration module for the range dashboard.

pub mod analysis;
pub mod binance;

pub(crate) mod debug;

pub mod persistence;
pub mod report;

// Re-export commonly used items
pub use analysis::{ANALYSIS, AnalysisConfig, SignalSettings};
pub use binance::{BINANCE, BinanceApiConfig};
pub use persistence::{CSV_EXPORT_PATH, PAIRS_PATH};
pub use report::{REPORT, ReportConfig};
