//! RSI (Relative Strength Index) indicator

use crate::indicators::error::{require, IndicatorError};
use crate::models::indicators::RsiIndicator;

pub const DEFAULT_RSI_PERIOD: u32 = 14;

/// Calculate RSI over the last `period` close-to-close transitions.
///
/// RSI = 100 - (100 / (1 + RS))
/// RS = Average Gain / Average Loss
///
/// Saturates at 100 when the average loss is zero.
pub fn calculate_rsi(closes: &[f64], period: u32) -> Result<RsiIndicator, IndicatorError> {
    let period_len = period as usize;
    require("RSI", period, period_len + 1, closes.len())?;

    let window = &closes[closes.len() - (period_len + 1)..];
    let mut gains = 0.0;
    let mut losses = 0.0;
    for pair in window.windows(2) {
        let change = pair[1] - pair[0];
        if change > 0.0 {
            gains += change;
        } else {
            losses += change.abs();
        }
    }

    let avg_gain = gains / period as f64;
    let avg_loss = losses / period as f64;

    if avg_loss == 0.0 {
        return Ok(RsiIndicator {
            value: 100.0,
            period,
        });
    }

    let rs = avg_gain / avg_loss;
    let rsi = 100.0 - (100.0 / (1.0 + rs));

    Ok(RsiIndicator { value: rsi, period })
}

/// Calculate RSI with default period (14)
pub fn calculate_rsi_default(closes: &[f64]) -> Result<RsiIndicator, IndicatorError> {
    calculate_rsi(closes, DEFAULT_RSI_PERIOD)
}
