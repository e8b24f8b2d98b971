//! Bollinger Bands indicator

use crate::common::math;
use crate::indicators::error::{require, IndicatorError};
use crate::models::indicators::BollingerBandsIndicator;

/// Calculate Bollinger Bands
///
/// Middle Band = SMA(period)
/// Upper Band = Middle + (std_dev * population standard deviation)
/// Lower Band = Middle - (std_dev * population standard deviation)
pub fn calculate_bollinger_bands(
    closes: &[f64],
    period: u32,
    std_dev: f64,
) -> Result<BollingerBandsIndicator, IndicatorError> {
    require("Bollinger", period, period as usize, closes.len())?;

    let too_short = || IndicatorError::insufficient("Bollinger", period as usize, closes.len());
    let middle = math::sma(closes, period as usize).ok_or_else(too_short)?;
    let std = math::standard_deviation(closes, period as usize).ok_or_else(too_short)?;

    Ok(BollingerBandsIndicator {
        upper: middle + (std_dev * std),
        middle,
        lower: middle - (std_dev * std),
        period,
        std_dev,
    })
}

/// Calculate Bollinger Bands with default parameters (20 SMA, 2σ)
pub fn calculate_bollinger_bands_default(
    closes: &[f64],
) -> Result<BollingerBandsIndicator, IndicatorError> {
    calculate_bollinger_bands(closes, 20, 2.0)
}
