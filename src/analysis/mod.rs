// Window statistics, signal classification and the dashboard pass
pub mod classifier;
pub mod dashboard;
pub mod window_stats;

// Re-export commonly used types
pub use classifier::{Classifier, RangeReference, classify};
pub use dashboard::{NoData, PassReport, PassSettings, SortKey, build_row, run_pass, sort_rows};
pub use window_stats::{StatsError, compute};
