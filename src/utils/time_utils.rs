use chrono::{DateTime, Local};
use thiserror::Error;

pub struct TimeUtils;

impl TimeUtils {
    pub const MS_IN_S: i64 = 1000;
    pub const MS_IN_MIN: i64 = Self::MS_IN_S * 60;
    pub const MS_IN_3_MIN: i64 = Self::MS_IN_S * 60 * 3;
    pub const MS_IN_5_MIN: i64 = Self::MS_IN_S * 60 * 5;
    pub const MS_IN_15_MIN: i64 = Self::MS_IN_S * 60 * 15;
    pub const MS_IN_30_MIN: i64 = Self::MS_IN_S * 60 * 30;
    pub const MS_IN_H: i64 = Self::MS_IN_MIN * 60;
    pub const MS_IN_2_H: i64 = Self::MS_IN_MIN * 60 * 2;
    pub const MS_IN_4_H: i64 = Self::MS_IN_MIN * 60 * 4;
    pub const MS_IN_6_H: i64 = Self::MS_IN_MIN * 60 * 6;
    pub const MS_IN_8_H: i64 = Self::MS_IN_MIN * 60 * 8;
    pub const MS_IN_12_H: i64 = Self::MS_IN_MIN * 60 * 12;
    pub const MS_IN_D: i64 = Self::MS_IN_H * 24;
    pub const MS_IN_3_D: i64 = Self::MS_IN_H * 24 * 3;
    pub const MS_IN_W: i64 = Self::MS_IN_D * 7;
    pub const MS_IN_1_M: i64 = Self::MS_IN_D * 30;
    pub const STANDARD_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

    /// Convert interval in milliseconds to a Binance-style shorthand (e.g. `30m`, `1h`).
    pub fn interval_to_string(interval_ms: i64) -> &'static str {
        match interval_ms {
            Self::MS_IN_S => "1s",
            Self::MS_IN_MIN => "1m",
            Self::MS_IN_3_MIN => "3m",
            Self::MS_IN_5_MIN => "5m",
            Self::MS_IN_15_MIN => "15m",
            Self::MS_IN_30_MIN => "30m",
            Self::MS_IN_H => "1h",
            Self::MS_IN_2_H => "2h",
            Self::MS_IN_4_H => "4h",
            Self::MS_IN_6_H => "6h",
            Self::MS_IN_8_H => "8h",
            Self::MS_IN_12_H => "12h",
            Self::MS_IN_D => "1d",
            Self::MS_IN_3_D => "3d",
            Self::MS_IN_W => "1w",
            Self::MS_IN_1_M => "1M",
            _ => "unknown",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DurationParseError {
    #[error("empty duration")]
    Empty,
    #[error("invalid duration count in '{0}'")]
    InvalidCount(String),
    #[error("unknown duration unit in '{0}' (expected s, m, h, d, w or M)")]
    UnknownUnit(String),
}

/// Parse a shorthand like `15m`, `24h`, `7d`, `1w` or `3M` into milliseconds.
/// `m` is minutes and `M` is a 30-day month, matching Binance interval names.
pub fn parse_duration_ms(text: &str) -> Result<i64, DurationParseError> {
    let text = text.trim();
    let unit = text.chars().last().ok_or(DurationParseError::Empty)?;
    let count_str = &text[..text.len() - unit.len_utf8()];

    let unit_ms = match unit {
        's' => TimeUtils::MS_IN_S,
        'm' => TimeUtils::MS_IN_MIN,
        'h' => TimeUtils::MS_IN_H,
        'd' => TimeUtils::MS_IN_D,
        'w' => TimeUtils::MS_IN_W,
        'M' => TimeUtils::MS_IN_1_M,
        _ => return Err(DurationParseError::UnknownUnit(text.to_string())),
    };

    let count: i64 = count_str
        .parse()
        .map_err(|_| DurationParseError::InvalidCount(text.to_string()))?;
    if count <= 0 {
        return Err(DurationParseError::InvalidCount(text.to_string()));
    }

    count
        .checked_mul(unit_ms)
        .ok_or_else(|| DurationParseError::InvalidCount(text.to_string()))
}

pub fn epoch_ms_to_utc(epoch_ms: i64) -> String {
    // Used for display purposes
    match DateTime::from_timestamp_millis(epoch_ms) {
        Some(dt) => dt.format(TimeUtils::STANDARD_TIME_FORMAT).to_string(),
        None => String::from("invalid timestamp"),
    }
}

pub fn local_now_as_string() -> String {
    Local::now().format(TimeUtils::STANDARD_TIME_FORMAT).to_string()
}
