//! Thin reqwest wrapper over the Bybit v5 market endpoints.

use crate::models::indicators::Candle;
use crate::services::market_data::MarketDataError;
use backon::{ExponentialBuilder, Retryable};
use chrono::{TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://api.bybit.com";
const CATEGORY: &str = "linear";
/// Largest page the kline endpoint serves.
pub const MAX_KLINE_LIMIT: usize = 1000;

/// Common response envelope. `result` is decoded only when `retCode == 0`.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "retCode")]
    ret_code: i64,
    #[serde(rename = "retMsg", default)]
    ret_msg: String,
    #[serde(default)]
    result: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct KlineResult {
    #[serde(default)]
    list: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ticker {
    pub symbol: String,
    #[serde(rename = "turnover24h", default)]
    pub turnover_24h: String,
}

impl Ticker {
    pub fn turnover(&self) -> Result<f64, MarketDataError> {
        self.turnover_24h.trim().parse().map_err(|_| {
            MarketDataError::Decode(format!(
                "{} turnover24h '{}' is not a number",
                self.symbol, self.turnover_24h
            ))
        })
    }
}

#[derive(Debug, Deserialize)]
struct TickerResult {
    #[serde(default)]
    list: Vec<Ticker>,
}

#[derive(Debug, Deserialize)]
struct OrderBookResult {
    #[serde(default)]
    b: Vec<Vec<String>>,
    #[serde(default)]
    a: Vec<Vec<String>>,
}

/// Summed resting size on each side of the book.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthTotals {
    pub bid_volume: f64,
    pub ask_volume: f64,
}

pub struct BybitRestClient {
    client: reqwest::Client,
    base_url: String,
    retry: ExponentialBuilder,
}

impl BybitRestClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, MarketDataError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self::with_client(base_url, client))
    }

    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            retry: ExponentialBuilder::default()
                .with_min_delay(Duration::from_millis(200))
                .with_max_times(3),
        }
    }

    /// Replace the retry policy for transient failures.
    pub fn with_retry(mut self, retry: ExponentialBuilder) -> Self {
        self.retry = retry;
        self
    }

    async fn get_once<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, MarketDataError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await?
            .error_for_status()?;

        let envelope: Envelope = response.json().await?;
        if envelope.ret_code != 0 {
            return Err(MarketDataError::Api {
                code: envelope.ret_code,
                message: envelope.ret_msg,
            });
        }
        serde_json::from_value(envelope.result).map_err(|e| MarketDataError::Decode(e.to_string()))
    }

    /// GET with exponential backoff on timeouts, connection errors and 5xx.
    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, MarketDataError> {
        (|| self.get_once::<T>(path, query))
            .retry(self.retry)
            .sleep(tokio::time::sleep)
            .when(is_transient)
            .notify(|err: &MarketDataError, delay: Duration| {
                warn!(path = %path, error = %err, delay_ms = delay.as_millis() as u64, "bybit request failed, retrying");
            })
            .await
    }

    /// Candles oldest first.
    pub async fn kline(
        &self,
        symbol: &str,
        interval: &str,
        limit: usize,
    ) -> Result<Vec<Candle>, MarketDataError> {
        let result: KlineResult = self
            .get(
                "/v5/market/kline",
                &[
                    ("category", CATEGORY.to_string()),
                    ("symbol", symbol.to_string()),
                    ("interval", interval.to_string()),
                    ("limit", limit.clamp(1, MAX_KLINE_LIMIT).to_string()),
                ],
            )
            .await?;

        // Bybit returns newest first.
        let mut candles = result
            .list
            .iter()
            .map(|row| parse_kline_row(row))
            .collect::<Result<Vec<_>, _>>()?;
        candles.reverse();

        debug!(symbol = %symbol, interval = %interval, count = candles.len(), "fetched klines");
        Ok(candles)
    }

    pub async fn tickers(&self) -> Result<Vec<Ticker>, MarketDataError> {
        let result: TickerResult = self
            .get("/v5/market/tickers", &[("category", CATEGORY.to_string())])
            .await?;
        Ok(result.list)
    }

    pub async fn order_book(&self, symbol: &str, depth: usize) -> Result<DepthTotals, MarketDataError> {
        let result: OrderBookResult = self
            .get(
                "/v5/market/orderbook",
                &[
                    ("category", CATEGORY.to_string()),
                    ("symbol", symbol.to_string()),
                    ("limit", depth.to_string()),
                ],
            )
            .await?;

        Ok(DepthTotals {
            bid_volume: sum_sizes(&result.b)?,
            ask_volume: sum_sizes(&result.a)?,
        })
    }
}

fn is_transient(err: &MarketDataError) -> bool {
    match err {
        MarketDataError::Http(e) => {
            e.is_timeout()
                || e.is_connect()
                || e.status().map(|s| s.is_server_error()).unwrap_or(false)
        }
        _ => false,
    }
}

fn parse_field(row: &[String], index: usize) -> Result<f64, MarketDataError> {
    row.get(index)
        .ok_or_else(|| MarketDataError::Decode(format!("kline row missing field {}", index)))?
        .parse()
        .map_err(|_| MarketDataError::Decode(format!("bad number in kline field {}", index)))
}

/// `[start_ms, open, high, low, close, volume, turnover]`
fn parse_kline_row(row: &[String]) -> Result<Candle, MarketDataError> {
    let start_ms: i64 = row
        .first()
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| MarketDataError::Decode("bad kline start time".to_string()))?;
    let timestamp = Utc
        .timestamp_millis_opt(start_ms)
        .single()
        .ok_or_else(|| MarketDataError::Decode(format!("kline start out of range: {}", start_ms)))?;

    Ok(Candle::new(
        parse_field(row, 1)?,
        parse_field(row, 2)?,
        parse_field(row, 3)?,
        parse_field(row, 4)?,
        parse_field(row, 5)?,
        timestamp,
    ))
}

/// Sum of the size column of `[price, size]` levels.
fn sum_sizes(levels: &[Vec<String>]) -> Result<f64, MarketDataError> {
    levels.iter().try_fold(0.0, |acc, level| {
        let size: f64 = level
            .get(1)
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| MarketDataError::Decode("bad order book level".to_string()))?;
        Ok(acc + size)
    })
}
