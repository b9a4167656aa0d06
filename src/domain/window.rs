use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::utils::time_utils::{self, DurationParseError};

/// A named look-back window: the trailing `length` bars of a series.
#[derive(Serialize, Deserialize, Debug, Clone, Hash, Eq, PartialEq)]
pub struct WindowSpec {
    pub label: String,
    pub length: usize,
}

#[derive(Debug, Error, PartialEq)]
pub enum WindowSpecError {
    #[error(transparent)]
    Duration(#[from] DurationParseError),
    #[error("window '{label}' is shorter than one {interval_ms}ms bar")]
    ShorterThanInterval { label: String, interval_ms: i64 },
    #[error("bar interval must be positive, got {0}ms")]
    InvalidInterval(i64),
}

impl WindowSpec {
    pub fn new(label: impl Into<String>, length: usize) -> Self {
        Self {
            label: label.into(),
            length,
        }
    }

    /// How many `interval_ms` bars cover `duration_ms`. Partial bars are dropped,
    /// so `90m` at `1h` bars is a single bar.
    pub fn from_duration(
        label: impl Into<String>,
        duration_ms: i64,
        interval_ms: i64,
    ) -> Result<Self, WindowSpecError> {
        let label = label.into();
        if interval_ms <= 0 {
            return Err(WindowSpecError::InvalidInterval(interval_ms));
        }
        let length = (duration_ms / interval_ms) as usize;
        if length == 0 {
            return Err(WindowSpecError::ShorterThanInterval { label, interval_ms });
        }
        Ok(Self { label, length })
    }

    /// Build from a shorthand like `24h` or `1w`, which doubles as the label.
    pub fn parse(shorthand: &str, interval_ms: i64) -> Result<Self, WindowSpecError> {
        let duration_ms = time_utils::parse_duration_ms(shorthand)?;
        Self::from_duration(shorthand.trim(), duration_ms, interval_ms)
    }
}
