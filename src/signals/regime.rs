//! Regime labels from the dominant timeframe.

use crate::models::indicators::IndicatorSnapshot;
use crate::models::signal::{Side, TrendLabel};

pub const MEAN_REVERSION_RSI_LOW: f64 = 35.0;
pub const MEAN_REVERSION_RSI_HIGH: f64 = 65.0;

/// Long-side classification.
pub fn classify(snapshot: &IndicatorSnapshot) -> TrendLabel {
    classify_for_side(snapshot, Side::Long)
}

/// Classify with the moving-average orderings mirrored for shorts.
/// RSI thresholds are the same on both sides.
pub fn classify_for_side(snapshot: &IndicatorSnapshot, side: Side) -> TrendLabel {
    let leads = |a: f64, b: f64| match side {
        Side::Long => a > b,
        Side::Short => a < b,
    };

    let fast_over_slow = leads(snapshot.ema_fast, snapshot.ema_slow);
    if fast_over_slow && leads(snapshot.ema_slow, snapshot.sma_mid) {
        return TrendLabel::StrongTrend;
    }
    if fast_over_slow {
        return TrendLabel::Trend;
    }
    if leads(snapshot.ema_fast, snapshot.sma_mid) {
        return TrendLabel::Swing;
    }

    let rsi_stretched =
        snapshot.rsi < MEAN_REVERSION_RSI_LOW || snapshot.rsi > MEAN_REVERSION_RSI_HIGH;
    let averages_not_leading = !leads(snapshot.sma_mid, snapshot.sma_slow);
    if rsi_stretched && averages_not_leading {
        return TrendLabel::MeanReversion;
    }

    TrendLabel::Scalp
}
