//! External collaborators: market data contracts and exchange adapters.

pub mod bybit;
pub mod market_data;

pub use market_data::{
    MarketDataError, MarketDataProvider, OrderBookProvider, StaticMarketData, StaticSymbolUniverse,
    SymbolUniverse,
};
