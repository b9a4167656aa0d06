use async_trait::async_trait;
use thiserror::Error;

use crate::domain::PairInterval;
use crate::models::OhlcvSeries;

/// Why a bar source could not supply a series. The source decides which case
/// applies; the dashboard only logs it and moves on to the next symbol.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The exchange has nothing for this request (unknown symbol, no history)
    #[error("no data: {0}")]
    NoData(String),
    /// The request failed but could succeed on a later pass
    #[error("transient fetch failure: {0}")]
    Transient(String),
}

impl FetchError {
    pub fn is_transient(&self) -> bool {
        matches!(self, FetchError::Transient(_))
    }
}

#[async_trait]
pub trait BarSource: Send + Sync {
    /// Fetch up to `max_bars` of the most recent bars, oldest first.
    async fn fetch_series(
        &self,
        pair_interval: &PairInterval,
        max_bars: usize,
    ) -> Result<OhlcvSeries, FetchError>;

    /// A unique identifier for this implementation (so that afterwards we know which one we used).
    fn signature(&self) -> &'static str;
}
