//! Volume indicators

use crate::common::math;
use crate::indicators::error::{require, IndicatorError};
use crate::models::indicators::VolumeIndicator;

/// Multiple of the average volume that counts as a spike.
pub const VOLUME_SPIKE_MULTIPLIER: f64 = 1.5;

/// Current volume alongside its `period`-bar moving average.
pub fn calculate_volume(volumes: &[f64], period: u32) -> Result<VolumeIndicator, IndicatorError> {
    require("Volume MA", period, period as usize, volumes.len())?;

    let too_short = || IndicatorError::insufficient("Volume MA", period as usize, volumes.len());
    let volume_ma = math::sma(volumes, period as usize).ok_or_else(too_short)?;
    let volume = *volumes.last().ok_or_else(too_short)?;

    Ok(VolumeIndicator {
        volume,
        volume_ma,
        volume_ma_period: period,
    })
}
