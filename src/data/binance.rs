// External crates
use anyhow::Result;
use async_trait::async_trait;
use binance_sdk::common::models::Interval as binance_interval;
use binance_sdk::config::ConfigurationRestApi;
use binance_sdk::models::RestApiRateLimit;
use binance_sdk::spot::{
    SpotRestApi,
    rest_api::{KlinesIntervalEnum, KlinesItemInner, KlinesParams, RestApi},
};
use binance_sdk::{errors, errors::ConnectorError as connection_error};
use chrono::Utc;
use thiserror::Error;
use tokio::time::{Duration, sleep};

// Local crates
#[cfg(debug_assertions)]
use crate::config::debug::{PRINT_KLINE_PAGING, PRINT_RATE_LIMITS};
use crate::config::binance::{BINANCE, BinanceApiConfig};
use crate::data::bar_source::{BarSource, FetchError};
use crate::domain::{Bar, PairInterval};
use crate::models::OhlcvSeries;
use crate::utils::TimeUtils;

pub fn try_interval_from_ms(ms: i64) -> Result<KlinesIntervalEnum, String> {
    match ms {
        TimeUtils::MS_IN_S => Ok(KlinesIntervalEnum::Interval1s),
        TimeUtils::MS_IN_MIN => Ok(KlinesIntervalEnum::Interval1m),
        TimeUtils::MS_IN_3_MIN => Ok(KlinesIntervalEnum::Interval3m),
        TimeUtils::MS_IN_5_MIN => Ok(KlinesIntervalEnum::Interval5m),
        TimeUtils::MS_IN_15_MIN => Ok(KlinesIntervalEnum::Interval15m),
        TimeUtils::MS_IN_30_MIN => Ok(KlinesIntervalEnum::Interval30m),
        TimeUtils::MS_IN_H => Ok(KlinesIntervalEnum::Interval1h),
        TimeUtils::MS_IN_2_H => Ok(KlinesIntervalEnum::Interval2h),
        TimeUtils::MS_IN_4_H => Ok(KlinesIntervalEnum::Interval4h),
        TimeUtils::MS_IN_6_H => Ok(KlinesIntervalEnum::Interval6h),
        TimeUtils::MS_IN_8_H => Ok(KlinesIntervalEnum::Interval8h),
        TimeUtils::MS_IN_12_H => Ok(KlinesIntervalEnum::Interval12h),
        TimeUtils::MS_IN_D => Ok(KlinesIntervalEnum::Interval1d),
        TimeUtils::MS_IN_3_D => Ok(KlinesIntervalEnum::Interval3d),
        TimeUtils::MS_IN_W => Ok(KlinesIntervalEnum::Interval1w),
        TimeUtils::MS_IN_1_M => Ok(KlinesIntervalEnum::Interval1M),
        _ => Err(format!("Unsupported interval: {}ms", ms)),
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum KlineError {
    #[error("kline row is too short")]
    InvalidLength,
    #[error("kline field '{0}' is missing or not a number")]
    InvalidType(&'static str),
}

/*
Binance sends each kline as a 12-element array: open time as an integer, then
open/high/low/close/volume as decimal strings, then fields we do not use.
*/
fn item_to_float(item: Option<KlinesItemInner>, field: &'static str) -> Result<f64, KlineError> {
    match item.ok_or(KlineError::InvalidLength)? {
        KlinesItemInner::String(s) => s.parse::<f64>().map_err(|_| KlineError::InvalidType(field)),
        _ => Err(KlineError::InvalidType(field)),
    }
}

fn kline_to_bar(kline: Vec<KlinesItemInner>) -> Result<Bar, KlineError> {
    let mut items = kline.into_iter();
    let timestamp_ms = match items.next().ok_or(KlineError::InvalidLength)? {
        KlinesItemInner::Integer(a) => a,
        _ => return Err(KlineError::InvalidType("open_time")),
    };
    let open = item_to_float(items.next(), "open")?;
    let high = item_to_float(items.next(), "high")?;
    let low = item_to_float(items.next(), "low")?;
    let close = item_to_float(items.next(), "close")?;
    let volume = item_to_float(items.next(), "volume")?;

    Ok(Bar::new(timestamp_ms, open, high, low, close, volume))
}

fn convert_klines(data: Vec<Vec<KlinesItemInner>>) -> Result<Vec<Bar>, KlineError> {
    data.into_iter().map(kline_to_bar).collect()
}

fn configure_binance_client(config: &BinanceApiConfig) -> Result<RestApi> {
    let rest_conf = ConfigurationRestApi::builder()
        .timeout(config.timeout_ms)
        .retries(config.retries)
        .backoff(config.backoff_ms)
        .build()?;
    // Create the Spot REST API client
    let rest_client = SpotRestApi::production(rest_conf);
    Ok(rest_client)
}

async fn handle_rate_limits(
    rate_limits: &Option<Vec<RestApiRateLimit>>,
    pair_interval: &PairInterval,
    #[cfg(debug_assertions)] call_count: u32,
) {
    let Some(value) = rate_limits else {
        return;
    };
    for rate_limit in value {
        if rate_limit.interval_num == 1 && rate_limit.interval == binance_interval::Minute {
            let current_weight = rate_limit.count;
            let required_headroom = BINANCE
                .klines
                .minute_weight_budget
                .saturating_sub(BINANCE.klines.page_weight);
            #[cfg(debug_assertions)]
            if PRINT_RATE_LIMITS && call_count.is_multiple_of(BINANCE.debug_print_interval) {
                log::info!(
                    "Binance min-weight: {} (headroom: {})",
                    current_weight,
                    required_headroom
                );
            }
            if current_weight > required_headroom {
                // Wait for the weight counter to reset at the start of the next minute
                let secs_into_min = Utc::now().timestamp().rem_euclid(60) as u64;
                let sleep_duration = Duration::from_secs(60 - secs_into_min);
                log::warn!(
                    "{} Binance weight {} above headroom {}, sleeping {:?}",
                    pair_interval,
                    current_weight,
                    required_headroom,
                    sleep_duration
                );
                sleep(sleep_duration).await;
            }
        }
    }
}

/// Merge one page (oldest first) in front of what we already hold.
///
/// Binance treats `endTime` as inclusive, so every page after the first repeats
/// the oldest bar we already have; that bar is dropped. Returns the end time for
/// the next request and whether history is exhausted.
fn splice_page(mut page: Vec<Bar>, limit: usize, all_bars: &mut Vec<Bar>) -> (Option<i64>, bool) {
    let Some(first) = page.first() else {
        return (None, true);
    };
    let next_end_time = Some(first.timestamp_ms);
    let mut exhausted = page.len() < limit;

    if let Some(oldest_held) = all_bars.first().map(|b| b.timestamp_ms) {
        page.retain(|b| b.timestamp_ms < oldest_held);
    }
    if page.is_empty() {
        // Only the duplicate came back, nothing older exists
        exhausted = true;
    }

    all_bars.splice(0..0, page);
    (next_end_time, exhausted)
}

fn map_connector_error(e: anyhow::Error, pair_interval: &PairInterval) -> FetchError {
    let Some(conn_err) = e.downcast_ref::<errors::ConnectorError>() else {
        log::error!(
            "An unexpected error occurred for {}: {:#}",
            pair_interval,
            e
        );
        return FetchError::Transient(format!("{}: {}", pair_interval, e));
    };

    match conn_err {
        // Unknown symbols and bad parameters will not fix themselves
        connection_error::ConnectorClientError(msg)
        | connection_error::BadRequestError(msg)
        | connection_error::NotFoundError(msg) => {
            log::warn!("{} rejected by Binance: {}", pair_interval, msg);
            FetchError::NoData(format!("{}: {}", pair_interval, msg))
        }
        connection_error::TooManyRequestsError(msg) => {
            log::error!("{} Rate limit exceeded. {}", pair_interval, msg);
            FetchError::Transient(format!("{}: rate limited: {}", pair_interval, msg))
        }
        connection_error::RateLimitBanError(msg) => {
            log::error!(
                "{} IP address banned due to excessive rate limits. {}",
                pair_interval,
                msg
            );
            FetchError::Transient(format!("{}: rate limit ban: {}", pair_interval, msg))
        }
        errors::ConnectorError::ServerError { msg, status_code } => {
            log::error!(
                "{} Server error: {} (status code: {:?})",
                pair_interval,
                msg,
                status_code
            );
            FetchError::Transient(format!("{}: server error: {}", pair_interval, msg))
        }
        errors::ConnectorError::NetworkError(msg) => {
            log::error!(
                "{} Network error: Check your internet connection. {}",
                pair_interval,
                msg
            );
            FetchError::Transient(format!("{}: network error: {}", pair_interval, msg))
        }
        other => {
            log::error!("Unexpected ConnectorError variant: {:?}", other);
            FetchError::Transient(format!("{}: {}", pair_interval, other))
        }
    }
}

async fn fetch_binance_klines_with_limits(
    rest_client: &RestApi,
    params: KlinesParams,
    pair_interval: &PairInterval,
) -> Result<(Option<Vec<RestApiRateLimit>>, Vec<Vec<KlinesItemInner>>), FetchError> {
    let response = rest_client
        .klines(params)
        .await
        .map_err(|e| map_connector_error(e, pair_interval))?;

    // Take the rate_limits from the response, then get the inner data
    let rate_limits = response.rate_limits.clone();
    let data = response
        .data()
        .await
        .map_err(|e| FetchError::Transient(format!("{}: {}", pair_interval, e)))?;
    Ok((rate_limits, data))
}

/// Pages backwards from now until `max_bars` are held or history runs out.
pub async fn load_bars(
    api_config: &BinanceApiConfig,
    pair_interval: &PairInterval,
    max_bars: usize,
) -> Result<Vec<Bar>, FetchError> {
    let rest_client = configure_binance_client(api_config)
        .map_err(|e| FetchError::Transient(format!("client setup failed: {:#}", e)))?;

    let mut end_time: Option<i64> = None;
    let mut all_bars: Vec<Bar> = Vec::new();
    let mut call_count: u32 = 0;

    while all_bars.len() < max_bars {
        let interval = try_interval_from_ms(pair_interval.interval_ms).map_err(FetchError::NoData)?;
        // Pages after the first repeat one bar, so ask for one extra
        let overlap = usize::from(end_time.is_some());
        let limit = (max_bars - all_bars.len() + overlap).min(BINANCE.klines.page_size as usize);

        let params = KlinesParams::builder(pair_interval.bn_name().to_string(), interval)
            .limit(limit as i32)
            .end_time(end_time)
            .build()
            .map_err(|e| FetchError::NoData(format!("{}: {}", pair_interval, e)))?;

        let (rate_limits, raw_klines) =
            fetch_binance_klines_with_limits(&rest_client, params, pair_interval).await?;

        handle_rate_limits(
            &rate_limits,
            pair_interval,
            #[cfg(debug_assertions)]
            call_count,
        )
        .await;
        call_count += 1;

        let page = convert_klines(raw_klines)
            .map_err(|e| FetchError::Transient(format!("{}: {}", pair_interval, e)))?;

        #[cfg(debug_assertions)]
        if PRINT_KLINE_PAGING {
            log::info!(
                "{} page {}: asked {}, got {} (end_time {:?})",
                pair_interval,
                call_count,
                limit,
                page.len(),
                end_time
            );
        }

        let (new_end_time, exhausted) = splice_page(page, limit, &mut all_bars);
        end_time = new_end_time;
        if exhausted {
            break;
        }
    }

    if all_bars.len() > max_bars {
        let excess = all_bars.len() - max_bars;
        all_bars.drain(..excess);
    }
    if all_bars.is_empty() {
        return Err(FetchError::NoData(format!(
            "{}: Binance returned no klines",
            pair_interval
        )));
    }
    log::debug!(
        "{} loaded {} klines in {} calls",
        pair_interval,
        all_bars.len(),
        call_count
    );
    Ok(all_bars)
}

/// Bar source backed by the Binance spot REST API.
pub struct BinanceBarSource {
    api_config: BinanceApiConfig,
}

impl BinanceBarSource {
    /// Fails when `interval_ms` is not a Binance kline interval.
    pub fn new(interval_ms: i64) -> Result<Self> {
        try_interval_from_ms(interval_ms).map_err(anyhow::Error::msg)?;
        Ok(Self {
            api_config: BinanceApiConfig::default(),
        })
    }
}

#[async_trait]
impl BarSource for BinanceBarSource {
    fn signature(&self) -> &'static str {
        "Binance API"
    }

    async fn fetch_series(
        &self,
        pair_interval: &PairInterval,
        max_bars: usize,
    ) -> Result<OhlcvSeries, FetchError> {
        let bars = load_bars(&self.api_config, pair_interval, max_bars).await?;
        OhlcvSeries::new(pair_interval.clone(), bars)
            .map_err(|e| FetchError::Transient(e.to_string()))
    }
}
