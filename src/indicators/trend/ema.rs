//! EMA (Exponential Moving Average) indicator

use crate::common::math;
use crate::indicators::error::{require, IndicatorError};
use crate::models::indicators::EmaIndicator;

/// Calculate EMA for a specific period.
///
/// Seeded with the SMA of the first `period` values, then
/// `v_t = v_{t-1} + (p_t - v_{t-1}) * 2 / (period + 1)`.
pub fn calculate_ema(values: &[f64], period: u32) -> Result<EmaIndicator, IndicatorError> {
    require("EMA", period, period as usize, values.len())?;
    let value = math::ema(values, period as usize)
        .ok_or_else(|| IndicatorError::insufficient("EMA", period as usize, values.len()))?;

    Ok(EmaIndicator { value, period })
}

/// Full EMA sequence, oldest first. Element 0 aligns with input index `period - 1`.
pub fn calculate_ema_series(values: &[f64], period: u32) -> Result<Vec<f64>, IndicatorError> {
    require("EMA", period, period as usize, values.len())?;
    math::ema_series(values, period as usize)
        .ok_or_else(|| IndicatorError::insufficient("EMA", period as usize, values.len()))
}

/// Calculate multiple EMAs at once, skipping periods without enough history.
pub fn calculate_emas(values: &[f64], periods: &[u32]) -> Vec<EmaIndicator> {
    periods
        .iter()
        .filter_map(|&period| calculate_ema(values, period).ok())
        .collect()
}

/// Compare a fast and slow EMA: 1 when fast is above, -1 below, 0 equal.
pub fn check_ema_cross(values: &[f64], fast_period: u32, slow_period: u32) -> Result<i32, IndicatorError> {
    let fast_ema = calculate_ema(values, fast_period)?;
    let slow_ema = calculate_ema(values, slow_period)?;

    Ok(if fast_ema.value > slow_ema.value {
        1
    } else if fast_ema.value < slow_ema.value {
        -1
    } else {
        0
    })
}
