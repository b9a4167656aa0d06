//! Debugging feature flags.
//!
//! Toggle individual diagnostics here; keep them `false` by default so
//! debug builds stay readable. All of them are further gated by
//! `cfg(debug_assertions)`.

/// Emit one line per Binance page request (limit, end time, bars received).
pub const PRINT_KLINE_PAGING: bool = false;

/// Emit the per-symbol window summary after each row is computed.
pub const PRINT_ROW_SUMMARY: bool = false;

/// Emit Binance request-weight readings every `debug_print_interval` calls.
pub const PRINT_RATE_LIMITS: bool = false;
