//! Trade levels and position sizing.

use crate::config::{EntryPolicy, RiskParameters, StopPolicy};
use crate::models::indicators::IndicatorSnapshot;
use crate::models::signal::Side;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Degenerate inputs; sizing fails closed instead of guarding a division.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SizingError {
    #[error("entry price must be positive, got {0}")]
    NonPositiveEntry(f64),

    #[error("stop distance must be positive and finite, got {0}")]
    InvalidStopDistance(f64),

    #[error("leverage must be positive, got {0}")]
    InvalidLeverage(f64),

    #[error("account balance must be positive, got {0}")]
    NonPositiveBalance(f64),

    #[error("position size rounds to {0}")]
    ZeroSize(f64),

    #[error("stop loss {stop_loss} is at or beyond liquidation {liquidation}")]
    StopBeyondLiquidation { stop_loss: f64, liquidation: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradeLevels {
    pub entry: f64,
    pub take_profit: f64,
    pub stop_loss: f64,
    pub liquidation: f64,
    pub trailing: f64,
}

impl TradeLevels {
    pub fn stop_distance(&self) -> f64 {
        (self.entry - self.stop_loss).abs()
    }

    /// Reward distance over risk distance.
    pub fn risk_reward(&self) -> f64 {
        let risk = self.stop_distance();
        if risk == 0.0 {
            0.0
        } else {
            (self.take_profit - self.entry).abs() / risk
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradePlan {
    pub levels: TradeLevels,
    pub position_size: f64,
    pub margin_used: f64,
    pub risk_amount: f64,
    pub risk_reward: f64,
}

/// Entry reference price for the configured policy.
pub fn select_entry(snapshot: &IndicatorSnapshot, policy: EntryPolicy) -> f64 {
    match policy {
        EntryPolicy::LastClose => snapshot.close,
        EntryPolicy::ClosestLevel => {
            let close = snapshot.close;
            [snapshot.sma_mid, snapshot.ema_fast, snapshot.ema_slow]
                .into_iter()
                .fold(snapshot.sma_mid, |best, level| {
                    if (level - close).abs() < (best - close).abs() {
                        level
                    } else {
                        best
                    }
                })
        }
    }
}

/// Take-profit, stop, liquidation and trailing levels around `entry`.
pub fn compute_levels(
    side: Side,
    entry: f64,
    atr: f64,
    params: &RiskParameters,
) -> Result<TradeLevels, SizingError> {
    if !(entry > 0.0) {
        return Err(SizingError::NonPositiveEntry(entry));
    }
    if !(params.leverage > 0.0) {
        return Err(SizingError::InvalidLeverage(params.leverage));
    }

    let sign = side.sign();
    let stop_distance = match params.stop_policy {
        StopPolicy::Fixed => entry * params.stop_loss_pct,
        StopPolicy::Atr {
            multiplier,
            min_distance_pct,
        } => (atr * multiplier).max(entry * min_distance_pct),
    };

    let stop_loss = entry - sign * stop_distance;
    let liquidation = entry * (1.0 - sign / params.leverage);
    // The stop must trigger before the position is liquidated.
    if (stop_loss - liquidation) * sign <= 0.0 {
        return Err(SizingError::StopBeyondLiquidation {
            stop_loss,
            liquidation,
        });
    }

    Ok(TradeLevels {
        entry,
        take_profit: entry * (1.0 + sign * params.take_profit_pct),
        stop_loss,
        liquidation,
        trailing: entry * (1.0 - sign * params.entry_buffer_pct),
    })
}

/// Size risking `balance * risk_fraction` on the stop distance, capped by
/// available margin, clamped to the configured bounds and floored to the
/// size step.
pub fn position_size(entry: f64, stop_loss: f64, params: &RiskParameters) -> Result<f64, SizingError> {
    if !(entry > 0.0) {
        return Err(SizingError::NonPositiveEntry(entry));
    }
    if !(params.leverage > 0.0) {
        return Err(SizingError::InvalidLeverage(params.leverage));
    }
    if !(params.account_balance > 0.0) {
        return Err(SizingError::NonPositiveBalance(params.account_balance));
    }
    let distance = (entry - stop_loss).abs();
    if !(distance > 0.0) || !distance.is_finite() {
        return Err(SizingError::InvalidStopDistance(distance));
    }

    let risk_amount = params.account_balance * params.risk_fraction;
    let risk_size = risk_amount / (distance * params.contract_size);
    let margin_size = params.account_balance / (entry * params.contract_size / params.leverage)
        * params.margin_utilization_cap;

    let mut size = risk_size.min(margin_size).max(params.min_position_size);
    if let Some(max) = params.max_position_size {
        size = size.min(max);
    }
    if let Some(step) = params.size_step.filter(|s| *s > 0.0) {
        size = (size / step).floor() * step;
    }

    if !(size > 0.0) || !size.is_finite() {
        return Err(SizingError::ZeroSize(size));
    }
    Ok(size)
}

/// Levels and size for `side` from the dominant snapshot.
pub fn compute_trade_plan(
    side: Side,
    snapshot: &IndicatorSnapshot,
    params: &RiskParameters,
) -> Result<TradePlan, SizingError> {
    let entry = select_entry(snapshot, params.entry_policy);
    let levels = compute_levels(side, entry, snapshot.atr, params)?;
    let size = position_size(levels.entry, levels.stop_loss, params)?;

    Ok(TradePlan {
        levels,
        position_size: size,
        margin_used: size * levels.entry * params.contract_size / params.leverage,
        risk_amount: params.account_balance * params.risk_fraction,
        risk_reward: levels.risk_reward(),
    })
}
