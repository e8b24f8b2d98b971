//! MACD (Moving Average Convergence Divergence) indicator

use crate::common::math;
use crate::indicators::error::{require, IndicatorError};
use crate::models::indicators::MacdIndicator;

/// Calculate MACD indicator
///
/// MACD = EMA(fast) - EMA(slow), as a series aligned on the slower EMA
/// Signal = EMA(signal) of the MACD series
/// Histogram = MACD - Signal
pub fn calculate_macd(
    closes: &[f64],
    fast_period: u32,
    slow_period: u32,
    signal_period: u32,
) -> Result<MacdIndicator, IndicatorError> {
    if fast_period == 0 || slow_period == 0 {
        return Err(IndicatorError::InvalidPeriod { indicator: "MACD" });
    }
    let fast = fast_period as usize;
    let slow = slow_period as usize;
    let longest = fast.max(slow);
    let required = longest + signal_period as usize - 1;
    require("MACD", signal_period, required, closes.len())?;

    let too_short = || IndicatorError::insufficient("MACD", required, closes.len());
    let fast_series = math::ema_series(closes, fast).ok_or_else(too_short)?;
    let slow_series = math::ema_series(closes, slow).ok_or_else(too_short)?;

    // Both series end at the last close; trim the front of the longer one.
    let macd_values: Vec<f64> = (longest - 1..closes.len())
        .map(|i| fast_series[i + 1 - fast] - slow_series[i + 1 - slow])
        .collect();

    let signal_series =
        math::ema_series(&macd_values, signal_period as usize).ok_or_else(too_short)?;

    let macd_line = *macd_values.last().ok_or_else(too_short)?;
    let signal_line = *signal_series.last().ok_or_else(too_short)?;

    Ok(MacdIndicator {
        macd: macd_line,
        signal: signal_line,
        histogram: macd_line - signal_line,
        period: (fast_period, slow_period, signal_period),
    })
}

/// Calculate MACD with default periods (12, 26, 9)
pub fn calculate_macd_default(closes: &[f64]) -> Result<MacdIndicator, IndicatorError> {
    calculate_macd(closes, 12, 26, 9)
}
