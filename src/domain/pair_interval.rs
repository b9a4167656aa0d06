use serde::{Deserialize, Serialize};

use crate::utils::TimeUtils;

/// Quote assets we know how to split off the end of a pair name.
static PAIR_QUOTES: &[&str] = &["USDT", "USDC", "FDUSD", "BTC", "ETH", "BNB"];

#[derive(Serialize, Deserialize, Debug, Clone, Hash, Eq, PartialEq)]
pub struct PairInterval {
    pub name: String,
    pub interval_ms: i64,
}

impl PairInterval {
    pub fn new(name: impl Into<String>, interval_ms: i64) -> Self {
        Self {
            name: name.into(),
            interval_ms,
        }
    }

    pub fn get_base(text: &str) -> Option<&str> {
        let quote = Self::get_quote(text)?;
        text.strip_suffix(quote).filter(|base| !base.is_empty())
    }

    // Finds the trading quote at the end of the pair name and returns it.
    // Returns None if no matching quote is found.
    pub fn get_quote(text: &str) -> Option<&str> {
        PAIR_QUOTES
            .iter()
            .find(|&&ext| text.ends_with(ext))
            .copied()
    }

    pub fn get_base_and_quote(text: &str) -> Option<(&str, &str)> {
        let base = Self::get_base(text)?;
        let quote = Self::get_quote(text)?;
        Some((base, quote))
    }

    /// Canonical exchange symbol: trimmed, upper-case, no separator.
    /// `btc/usdt` and `BTC-USDT` both become `BTCUSDT`.
    pub fn normalize_symbol(text: &str) -> String {
        text.trim()
            .chars()
            .filter(|c| !matches!(c, '/' | '-' | '_' | ' '))
            .collect::<String>()
            .to_uppercase()
    }

    // The name we pass into the Binance API (not necessarily display name)
    pub fn bn_name(&self) -> &str {
        &self.name
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for PairInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match Self::get_base_and_quote(&self.name) {
            Some((base, quote)) => write!(
                f,
                "{}/{} ({})",
                base,
                quote,
                TimeUtils::interval_to_string(self.interval_ms)
            ),
            None => write!(
                f,
                "{} ({})",
                self.name,
                TimeUtils::interval_to_string(self.interval_ms)
            ),
        }
    }
}
