//! Shared data models spanning the engine layers.

pub mod indicators;
pub mod signal;

pub use indicators::{
    AtrIndicator, BollingerBandsIndicator, Candle, CandleSeries, EmaIndicator, IndicatorSnapshot,
    MacdIndicator, RsiIndicator, SmaIndicator, Timeframe, VolumeIndicator,
};
pub use signal::{OrderBookBias, Side, Signal, SignalReason, Strategy, TrendLabel};
