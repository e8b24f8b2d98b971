//! Cross-timeframe direction agreement.

use crate::config::ConfirmationMode;
use crate::models::indicators::IndicatorSnapshot;
use crate::models::signal::Side;
use crate::signals::error::Rejection;
use serde::{Deserialize, Serialize};

/// Direction vote of a single timeframe.
///
/// Band breakouts take precedence over the EMA(slow) comparison; a close
/// sitting exactly on every level abstains.
pub fn vote(snapshot: &IndicatorSnapshot) -> Option<Side> {
    if snapshot.is_above_upper_band() {
        Some(Side::Long)
    } else if snapshot.is_below_lower_band() {
        Some(Side::Short)
    } else if snapshot.close > snapshot.ema_slow {
        Some(Side::Long)
    } else if snapshot.close < snapshot.ema_slow {
        Some(Side::Short)
    } else {
        None
    }
}

/// Side every timeframe agrees on, or `DirectionConflict`.
pub fn confirm(snapshots: &[IndicatorSnapshot], mode: ConfirmationMode) -> Result<Side, Rejection> {
    let votes: Vec<_> = snapshots.iter().map(|s| (s.timeframe, vote(s))).collect();
    let conflict = || Rejection::DirectionConflict {
        votes: votes.clone(),
    };

    if mode == ConfirmationMode::Strict && votes.iter().any(|(_, v)| v.is_none()) {
        return Err(conflict());
    }

    let mut cast = votes.iter().filter_map(|(_, v)| *v);
    let first = cast.next().ok_or_else(conflict)?;
    if cast.all(|side| side == first) {
        Ok(first)
    } else {
        Err(conflict())
    }
}

/// Trend context of one timeframe, used by the unanimity bonus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendBias {
    Bullish,
    Bearish,
    Neutral,
}

impl TrendBias {
    pub fn matches(&self, side: Side) -> bool {
        matches!(
            (self, side),
            (TrendBias::Bullish, Side::Long) | (TrendBias::Bearish, Side::Short)
        )
    }
}

pub fn trend_vote(snapshot: &IndicatorSnapshot) -> TrendBias {
    if snapshot.close > snapshot.sma_slow && snapshot.ema_fast > snapshot.ema_slow {
        TrendBias::Bullish
    } else if snapshot.close < snapshot.sma_slow && snapshot.ema_fast < snapshot.ema_slow {
        TrendBias::Bearish
    } else {
        TrendBias::Neutral
    }
}
