//! Z-score of the latest value against a trailing window

use crate::common::math;
use crate::indicators::error::{require, IndicatorError};

/// `(last - mean) / stddev` over the last `period` values; 0 when stddev is 0.
pub fn calculate_zscore(values: &[f64], period: u32) -> Result<f64, IndicatorError> {
    require("Z-score", period, period as usize, values.len())?;

    let too_short = || IndicatorError::insufficient("Z-score", period as usize, values.len());
    let mean = math::sma(values, period as usize).ok_or_else(too_short)?;
    let std = math::standard_deviation(values, period as usize).ok_or_else(too_short)?;
    let last = *values.last().ok_or_else(too_short)?;

    if std == 0.0 {
        return Ok(0.0);
    }
    Ok((last - mean) / std)
}
