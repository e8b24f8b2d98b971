//! Low-level numeric primitives used by the indicator library.
//!
//! These helpers operate on plain slices and return `Option` when the input is
//! too short; the `indicators` layer turns that into a typed error.

/// Arithmetic mean of the last `period` values.
pub fn sma(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period {
        return None;
    }
    let window = &values[values.len() - period..];
    Some(window.iter().sum::<f64>() / period as f64)
}

/// Smoothing factor `2 / (period + 1)`.
pub fn ema_multiplier(period: usize) -> f64 {
    2.0 / (period as f64 + 1.0)
}

/// One EMA step from the previous value.
pub fn ema_from_previous(price: f64, previous: f64, period: usize) -> f64 {
    previous + (price - previous) * ema_multiplier(period)
}

/// EMA seeded with the SMA of the first `period` values and rolled forward
/// over the rest. Index 0 of the result corresponds to input index `period - 1`.
pub fn ema_series(values: &[f64], period: usize) -> Option<Vec<f64>> {
    if period == 0 || values.len() < period {
        return None;
    }
    let seed = values[..period].iter().sum::<f64>() / period as f64;
    let mut series = Vec::with_capacity(values.len() - period + 1);
    series.push(seed);

    let mut current = seed;
    for &price in &values[period..] {
        current = ema_from_previous(price, current, period);
        series.push(current);
    }
    Some(series)
}

/// Final EMA value.
pub fn ema(values: &[f64], period: usize) -> Option<f64> {
    ema_series(values, period).and_then(|s| s.last().copied())
}

/// Population standard deviation of the last `period` values.
pub fn standard_deviation(values: &[f64], period: usize) -> Option<f64> {
    let mean = sma(values, period)?;
    let window = &values[values.len() - period..];
    let variance = window.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / period as f64;
    Some(variance.sqrt())
}

/// True range of one bar against the previous close.
pub fn true_range(high: f64, low: f64, prev_close: f64) -> f64 {
    (high - low)
        .max((high - prev_close).abs())
        .max((low - prev_close).abs())
}

/// Wilder smoothing: seed with the mean of the first `period` values, then
/// `v_t = (v_{t-1} * (period - 1) + x_t) / period`.
pub fn wilder_series(values: &[f64], period: usize) -> Option<Vec<f64>> {
    if period == 0 || values.len() < period {
        return None;
    }
    let seed = values[..period].iter().sum::<f64>() / period as f64;
    let mut series = Vec::with_capacity(values.len() - period + 1);
    series.push(seed);

    let mut current = seed;
    for &value in &values[period..] {
        current = (current * (period as f64 - 1.0) + value) / period as f64;
        series.push(current);
    }
    Some(series)
}
