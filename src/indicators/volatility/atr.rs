//! ATR (Average True Range) indicator

use crate::common::math;
use crate::indicators::error::{require, IndicatorError};
use crate::models::indicators::AtrIndicator;

pub const DEFAULT_ATR_PERIOD: u32 = 14;

/// True range for every bar after the first.
pub fn true_ranges(highs: &[f64], lows: &[f64], closes: &[f64]) -> Result<Vec<f64>, IndicatorError> {
    if highs.len() != lows.len() || lows.len() != closes.len() {
        return Err(IndicatorError::LengthMismatch { indicator: "ATR" });
    }
    Ok((1..closes.len())
        .map(|i| math::true_range(highs[i], lows[i], closes[i - 1]))
        .collect())
}

/// ATR sequence, oldest first.
///
/// Seeded with the SMA of the first `period` true ranges, then Wilder-smoothed:
/// `atr_t = (atr_{t-1} * (period - 1) + tr_t) / period`.
pub fn calculate_atr_series(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    period: u32,
) -> Result<Vec<f64>, IndicatorError> {
    let tr_values = true_ranges(highs, lows, closes)?;
    require("ATR", period, period as usize + 1, closes.len())?;

    math::wilder_series(&tr_values, period as usize)
        .ok_or_else(|| IndicatorError::insufficient("ATR", period as usize + 1, closes.len()))
}

/// Latest ATR value.
pub fn calculate_atr(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    period: u32,
) -> Result<AtrIndicator, IndicatorError> {
    let series = calculate_atr_series(highs, lows, closes, period)?;
    let value = series
        .last()
        .copied()
        .ok_or_else(|| IndicatorError::insufficient("ATR", period as usize + 1, closes.len()))?;

    Ok(AtrIndicator { value, period })
}

/// Calculate ATR with default period (14)
pub fn calculate_atr_default(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
) -> Result<AtrIndicator, IndicatorError> {
    calculate_atr(highs, lows, closes, DEFAULT_ATR_PERIOD)
}
