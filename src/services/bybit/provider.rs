//! Bybit-backed implementation of the market data contracts.

use super::client::BybitRestClient;
use crate::models::indicators::{Candle, Timeframe};
use crate::models::signal::OrderBookBias;
use crate::services::market_data::{
    MarketDataError, MarketDataProvider, OrderBookProvider, SymbolUniverse,
};
use async_trait::async_trait;
use std::cmp::Ordering;
use tracing::debug;

const ORDER_BOOK_DEPTH: usize = 50;
const QUOTE_SUFFIX: &str = "USDT";

pub struct BybitMarketDataProvider {
    client: BybitRestClient,
}

impl BybitMarketDataProvider {
    pub fn new(client: BybitRestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MarketDataProvider for BybitMarketDataProvider {
    async fn get_candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Candle>, MarketDataError> {
        let candles = self
            .client
            .kline(symbol, timeframe.bybit_interval(), limit)
            .await?;
        if candles.is_empty() {
            return Err(MarketDataError::Empty(format!("{} {}", symbol, timeframe)));
        }
        Ok(candles)
    }
}

#[async_trait]
impl SymbolUniverse for BybitMarketDataProvider {
    /// USDT-quoted linear perpetuals, most traded first.
    async fn get_symbols(&self, limit: usize) -> Result<Vec<String>, MarketDataError> {
        let mut ranked: Vec<(String, f64)> = self
            .client
            .tickers()
            .await?
            .into_iter()
            .filter(|t| t.symbol.ends_with(QUOTE_SUFFIX))
            .filter_map(|t| match t.turnover() {
                Ok(turnover) => Some((t.symbol, turnover)),
                Err(e) => {
                    debug!(symbol = %t.symbol, error = %e, "dropping ticker without turnover");
                    None
                }
            })
            .collect();
        if ranked.is_empty() {
            return Err(MarketDataError::Empty("USDT tickers".to_string()));
        }

        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        Ok(ranked.into_iter().take(limit).map(|(symbol, _)| symbol).collect())
    }
}

#[async_trait]
impl OrderBookProvider for BybitMarketDataProvider {
    async fn get_order_book_bias(&self, symbol: &str) -> Result<OrderBookBias, MarketDataError> {
        let depth = self.client.order_book(symbol, ORDER_BOOK_DEPTH).await?;
        Ok(OrderBookBias::from_depth(depth.bid_volume, depth.ask_volume))
    }
}
