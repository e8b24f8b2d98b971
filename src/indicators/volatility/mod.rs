//! Volatility indicators: Bollinger Bands, ATR, Z-score

pub mod atr;
pub mod bollinger;
pub mod zscore;

pub use atr::*;
pub use bollinger::*;
pub use zscore::*;
