//! Builds one indicator snapshot per (symbol, timeframe).

use crate::config::IndicatorSettings;
use crate::indicators::error::IndicatorError;
use crate::indicators::momentum::{calculate_macd, calculate_rsi};
use crate::indicators::trend::{calculate_ema, calculate_sma};
use crate::indicators::volatility::{
    calculate_atr_series, calculate_bollinger_bands, calculate_zscore,
};
use crate::indicators::volume::calculate_volume;
use crate::models::indicators::{Candle, CandleSeries, IndicatorSnapshot, Timeframe};

/// Computes every indicator of a snapshot from the same [`CandleSeries`].
#[derive(Debug, Clone, Default)]
pub struct SnapshotBuilder {
    settings: IndicatorSettings,
}

impl SnapshotBuilder {
    pub fn new(settings: IndicatorSettings) -> Self {
        Self { settings }
    }

    pub fn build(
        &self,
        timeframe: Timeframe,
        candles: &[Candle],
    ) -> Result<IndicatorSnapshot, IndicatorError> {
        if candles.len() < self.settings.min_bars {
            return Err(IndicatorError::InsufficientData {
                indicator: "snapshot",
                required: self.settings.min_bars,
                available: candles.len(),
            });
        }
        self.build_from_series(timeframe, &CandleSeries::from_candles(candles))
    }

    pub fn build_from_series(
        &self,
        timeframe: Timeframe,
        series: &CandleSeries,
    ) -> Result<IndicatorSnapshot, IndicatorError> {
        let s = &self.settings;
        let closes = &series.closes;

        let ema_fast = calculate_ema(closes, s.ema_fast)?;
        let ema_slow = calculate_ema(closes, s.ema_slow)?;
        let sma_mid = calculate_sma(closes, s.sma_mid)?;
        let sma_slow = calculate_sma(closes, s.sma_slow)?;
        let rsi = calculate_rsi(closes, s.rsi_period)?;
        let macd = calculate_macd(closes, s.macd_fast, s.macd_slow, s.macd_signal)?;
        let bands = calculate_bollinger_bands(closes, s.bollinger_period, s.bollinger_std_dev)?;
        let atr_series = calculate_atr_series(&series.highs, &series.lows, closes, s.atr_period)?;
        let volume = calculate_volume(&series.volumes, s.volume_avg_period)?;

        let atr = *atr_series.last().ok_or(IndicatorError::InsufficientData {
            indicator: "ATR",
            required: s.atr_period as usize + 1,
            available: closes.len(),
        })?;
        // Optional: only needs enough ATR history, never disqualifies the snapshot.
        let atr_zscore = calculate_zscore(&atr_series, s.atr_zscore_period).ok();

        let close = series.last_close().ok_or(IndicatorError::InsufficientData {
            indicator: "snapshot",
            required: 1,
            available: 0,
        })?;

        Ok(IndicatorSnapshot {
            timeframe,
            close,
            ema_fast: ema_fast.value,
            ema_slow: ema_slow.value,
            sma_mid: sma_mid.value,
            sma_slow: sma_slow.value,
            rsi: rsi.value,
            macd_line: macd.macd,
            macd_signal: macd.signal,
            macd_histogram: macd.histogram,
            bollinger_upper: bands.upper,
            bollinger_mid: bands.middle,
            bollinger_lower: bands.lower,
            atr,
            atr_zscore,
            volume: volume.volume,
            volume_avg: volume.volume_ma,
        })
    }
}
