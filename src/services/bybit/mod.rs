//! Bybit v5 public REST adapter (linear perpetuals).

pub mod client;
pub mod provider;

pub use client::{BybitRestClient, DepthTotals, Ticker};
pub use provider::BybitMarketDataProvider;
