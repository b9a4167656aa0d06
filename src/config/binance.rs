//! Binance spot REST settings.

/// Timeout and retry behaviour handed to the SDK client.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinanceApiConfig {
    pub timeout_ms: u64,
    pub retries: u32,
    pub backoff_ms: u64,
}

impl Default for BinanceApiConfig {
    fn default() -> Self {
        BINANCE.client
    }
}

/// Page size and the per-minute request weight budget for `/api/v3/klines`
pub struct KlineLimits {
    /// Bars per page; Binance refuses more than 1000
    pub page_size: i32,
    /// Request weight allowed per minute (Binance FAQ)
    pub minute_weight_budget: u32,
    /// Weight charged for one page at `page_size`
    pub page_weight: u32,
}

pub struct BinanceConfig {
    pub klines: KlineLimits,
    pub client: BinanceApiConfig,
    /// Debug builds print rate-limit readings every this many pages
    pub debug_print_interval: u32,
    /// Symbols beyond this many in the list are ignored
    pub max_pairs: usize,
}

pub const BINANCE: BinanceConfig = BinanceConfig {
    klines: KlineLimits {
        page_size: 1000,
        minute_weight_budget: 6000,
        page_weight: 2,
    },
    client: BinanceApiConfig {
        timeout_ms: 5000,
        retries: 5,
        backoff_ms: 5000,
    },
    debug_print_interval: 10,
    max_pairs: 100,
};
