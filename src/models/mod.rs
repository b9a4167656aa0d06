// Domain models for range analysis
// These modules contain pure data, independent of fetching and reporting

pub mod row;
pub mod series;

// Re-export key types for convenience
pub use row::{EverStat, Row, Signal, TradeLevels, WindowStat};
pub use series::{OhlcvSeries, SeriesError, SeriesSlice};
