// Symbol lists and bar history
pub mod bar_source;
pub mod binance;
pub mod symbols;

// Re-export commonly used types
pub use bar_source::{BarSource, FetchError};
pub use binance::BinanceBarSource;
pub use symbols::load_symbols;
