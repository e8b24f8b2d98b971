//! Unit tests for trade levels and sizing

use crate::support::{assert_close, bullish_snapshot, snapshot};
use perpscan::config::{EntryPolicy, RiskParameters, StopPolicy};
use perpscan::models::indicators::{IndicatorSnapshot, Timeframe};
use perpscan::models::signal::Side;
use perpscan::signals::risk::{compute_levels, position_size, select_entry};
use perpscan::signals::{compute_trade_plan, SizingError};

fn params() -> RiskParameters {
    RiskParameters {
        account_balance: 100.0,
        risk_fraction: 0.015,
        leverage: 20.0,
        ..RiskParameters::default()
    }
}

#[test]
fn test_risk_bound_size() {
    // risk amount 1.5 over a 30-point stop
    let size = position_size(2000.0, 1970.0, &params()).unwrap();
    assert_close(size, 0.05, 1e-12);
    assert_close(size * 30.0, 1.5, 1e-9);
}

#[test]
fn test_margin_cap_binds() {
    let params = RiskParameters {
        leverage: 1.0,
        ..params()
    };
    // risk size 1.5, margin size 100 / 2000 * 0.9
    let size = position_size(2000.0, 1999.0, &params).unwrap();
    assert_close(size, 0.045, 1e-12);
}

#[test]
fn test_size_bounds_and_step() {
    let capped = RiskParameters {
        max_position_size: Some(0.01),
        ..params()
    };
    assert_close(position_size(2000.0, 1970.0, &capped).unwrap(), 0.01, 1e-12);

    let floored = RiskParameters {
        min_position_size: 0.1,
        ..params()
    };
    assert_close(position_size(2000.0, 1970.0, &floored).unwrap(), 0.1, 1e-12);

    let stepped = RiskParameters {
        size_step: Some(0.02),
        ..params()
    };
    assert_close(position_size(2000.0, 1970.0, &stepped).unwrap(), 0.04, 1e-9);

    let too_coarse = RiskParameters {
        size_step: Some(0.1),
        ..params()
    };
    assert!(matches!(
        position_size(2000.0, 1970.0, &too_coarse),
        Err(SizingError::ZeroSize(_))
    ));
}

#[test]
fn test_contract_size_scales_down() {
    let gold = RiskParameters {
        contract_size: 100.0,
        ..params()
    };
    assert_close(position_size(2000.0, 1970.0, &gold).unwrap(), 0.0005, 1e-12);
}

#[test]
fn test_sizing_fails_closed() {
    assert_eq!(
        position_size(0.0, -1.0, &params()),
        Err(SizingError::NonPositiveEntry(0.0))
    );
    assert_eq!(
        position_size(100.0, 100.0, &params()),
        Err(SizingError::InvalidStopDistance(0.0))
    );
    let no_leverage = RiskParameters {
        leverage: 0.0,
        ..params()
    };
    assert_eq!(
        position_size(100.0, 99.0, &no_leverage),
        Err(SizingError::InvalidLeverage(0.0))
    );
    let broke = RiskParameters {
        account_balance: 0.0,
        ..params()
    };
    assert_eq!(
        position_size(100.0, 99.0, &broke),
        Err(SizingError::NonPositiveBalance(0.0))
    );
}

#[test]
fn test_fixed_levels_short() {
    let params = RiskParameters {
        take_profit_pct: 0.02,
        stop_loss_pct: 0.01,
        leverage: 10.0,
        entry_buffer_pct: 0.002,
        ..params()
    };
    let levels = compute_levels(Side::Short, 100.0, 1.0, &params).unwrap();
    assert_close(levels.take_profit, 98.0, 1e-9);
    assert_close(levels.stop_loss, 101.0, 1e-9);
    assert_close(levels.liquidation, 110.0, 1e-9);
    assert_close(levels.trailing, 100.2, 1e-9);
    assert_close(levels.risk_reward(), 2.0, 1e-9);
}

#[test]
fn test_atr_stop_distance() {
    let params = RiskParameters {
        stop_policy: StopPolicy::Atr {
            multiplier: 1.5,
            min_distance_pct: 0.002,
        },
        ..params()
    };
    let levels = compute_levels(Side::Long, 100.0, 2.0, &params).unwrap();
    assert_close(levels.stop_loss, 97.0, 1e-12);

    // Tiny ATR falls back to the minimum distance.
    let levels = compute_levels(Side::Long, 100.0, 0.01, &params).unwrap();
    assert_close(levels.stop_loss, 99.8, 1e-12);
}

#[test]
fn test_entry_policies() {
    let snap = IndicatorSnapshot {
        close: 100.0,
        sma_mid: 98.0,
        ema_fast: 99.5,
        ema_slow: 101.0,
        ..snapshot(Timeframe::H1)
    };
    assert_eq!(select_entry(&snap, EntryPolicy::LastClose), 100.0);
    assert_eq!(select_entry(&snap, EntryPolicy::ClosestLevel), 99.5);
}

#[test]
fn test_trade_plan_long() {
    let plan = compute_trade_plan(Side::Long, &bullish_snapshot(Timeframe::H1), &params()).unwrap();
    let levels = plan.levels;

    // EMA(fast) 103 is the closest level to the 104 close.
    assert_eq!(levels.entry, 103.0);
    assert!(levels.take_profit > levels.entry);
    assert!(levels.stop_loss < levels.entry);
    assert!(levels.liquidation < levels.stop_loss);
    assert_close(plan.position_size * levels.stop_distance(), plan.risk_amount, 1e-9);
    assert_close(plan.margin_used, plan.position_size * 103.0 / 20.0, 1e-9);
    assert_close(plan.risk_reward, 1.0, 1e-9);
}

#[test]
fn test_stop_beyond_liquidation_fails_closed() {
    let params = RiskParameters {
        leverage: 100.0,
        ..params()
    };
    // 1% liquidation distance is inside the 1.5% stop.
    let err = compute_levels(Side::Long, 2000.0, 10.0, &params).unwrap_err();
    match err {
        SizingError::StopBeyondLiquidation {
            stop_loss,
            liquidation,
        } => {
            assert_close(stop_loss, 1970.0, 1e-9);
            assert_close(liquidation, 1980.0, 1e-9);
        }
        other => panic!("unexpected error {:?}", other),
    }

    assert!(matches!(
        compute_levels(Side::Short, 2000.0, 10.0, &params),
        Err(SizingError::StopBeyondLiquidation { .. })
    ));

    // Stop exactly on the liquidation price is rejected too.
    let edge = RiskParameters {
        leverage: 50.0,
        stop_loss_pct: 0.02,
        ..self::params()
    };
    assert!(compute_levels(Side::Long, 100.0, 1.0, &edge).is_err());
}

#[test]
fn test_wide_atr_stop_beyond_liquidation() {
    let params = RiskParameters {
        stop_policy: StopPolicy::Atr {
            multiplier: 1.5,
            min_distance_pct: 0.002,
        },
        ..params()
    };
    // 1.5 * 4 = 6 points against a 5% liquidation distance on 100.
    assert!(matches!(
        compute_levels(Side::Long, 100.0, 4.0, &params),
        Err(SizingError::StopBeyondLiquidation { .. })
    ));
    assert!(compute_levels(Side::Long, 100.0, 3.0, &params).is_ok());
}
