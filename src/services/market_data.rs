//! Collaborator contracts for market data, plus an in-memory implementation.

use crate::models::indicators::{Candle, Timeframe};
use crate::models::signal::OrderBookBias;
use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("api error {code}: {message}")]
    Api { code: i64, message: String },

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("no data for {0}")]
    Empty(String),
}

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Candles oldest first, at most `limit`.
    async fn get_candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Candle>, MarketDataError>;
}

#[async_trait]
pub trait SymbolUniverse: Send + Sync {
    async fn get_symbols(&self, limit: usize) -> Result<Vec<String>, MarketDataError>;
}

#[async_trait]
pub trait OrderBookProvider: Send + Sync {
    async fn get_order_book_bias(&self, symbol: &str) -> Result<OrderBookBias, MarketDataError>;
}

/// Preloaded candles and order-book biases.
#[derive(Debug, Clone, Default)]
pub struct StaticMarketData {
    candles: HashMap<(String, Timeframe), Vec<Candle>>,
    biases: HashMap<String, OrderBookBias>,
}

impl StaticMarketData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_candles(mut self, symbol: &str, timeframe: Timeframe, candles: Vec<Candle>) -> Self {
        self.candles.insert((symbol.to_string(), timeframe), candles);
        self
    }

    pub fn with_bias(mut self, symbol: &str, bias: OrderBookBias) -> Self {
        self.biases.insert(symbol.to_string(), bias);
        self
    }
}

#[async_trait]
impl MarketDataProvider for StaticMarketData {
    async fn get_candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Candle>, MarketDataError> {
        let candles = self
            .candles
            .get(&(symbol.to_string(), timeframe))
            .ok_or_else(|| MarketDataError::Empty(format!("{} {}", symbol, timeframe)))?;
        let start = candles.len().saturating_sub(limit);
        Ok(candles[start..].to_vec())
    }
}

#[async_trait]
impl OrderBookProvider for StaticMarketData {
    async fn get_order_book_bias(&self, symbol: &str) -> Result<OrderBookBias, MarketDataError> {
        Ok(self
            .biases
            .get(symbol)
            .copied()
            .unwrap_or(OrderBookBias::Neutral))
    }
}

/// Fixed symbol list, truncated to the requested limit.
#[derive(Debug, Clone, Default)]
pub struct StaticSymbolUniverse {
    symbols: Vec<String>,
}

impl StaticSymbolUniverse {
    pub fn new(symbols: Vec<String>) -> Self {
        Self { symbols }
    }
}

#[async_trait]
impl SymbolUniverse for StaticSymbolUniverse {
    async fn get_symbols(&self, limit: usize) -> Result<Vec<String>, MarketDataError> {
        if self.symbols.is_empty() {
            return Err(MarketDataError::Empty("symbol universe".to_string()));
        }
        Ok(self.symbols.iter().take(limit).cloned().collect())
    }
}
