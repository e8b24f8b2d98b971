//! SMA (Simple Moving Average) indicator

use crate::common::math;
use crate::indicators::error::{require, IndicatorError};
use crate::models::indicators::SmaIndicator;

/// Arithmetic mean of the last `period` values.
pub fn calculate_sma(values: &[f64], period: u32) -> Result<SmaIndicator, IndicatorError> {
    require("SMA", period, period as usize, values.len())?;
    let value = math::sma(values, period as usize)
        .ok_or_else(|| IndicatorError::insufficient("SMA", period as usize, values.len()))?;

    Ok(SmaIndicator { value, period })
}
