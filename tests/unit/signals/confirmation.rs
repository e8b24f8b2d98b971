//! Unit tests for cross-timeframe confirmation

use crate::support::{bearish_snapshot, bullish_snapshot, snapshot};
use perpscan::config::ConfirmationMode;
use perpscan::models::indicators::{IndicatorSnapshot, Timeframe};
use perpscan::models::signal::Side;
use perpscan::signals::{confirm, trend_vote, vote, Rejection, TrendBias};

#[test]
fn test_vote_prefers_band_breakout() {
    // Above the upper band but below EMA21 still votes long.
    let snap = IndicatorSnapshot {
        close: 106.0,
        ema_slow: 110.0,
        ..snapshot(Timeframe::H1)
    };
    assert_eq!(vote(&snap), Some(Side::Long));

    let snap = IndicatorSnapshot {
        close: 94.0,
        ema_slow: 90.0,
        ..snapshot(Timeframe::H1)
    };
    assert_eq!(vote(&snap), Some(Side::Short));
}

#[test]
fn test_vote_falls_back_to_ema_slow() {
    let above = IndicatorSnapshot {
        close: 101.0,
        ..snapshot(Timeframe::H1)
    };
    let below = IndicatorSnapshot {
        close: 99.0,
        ..snapshot(Timeframe::H1)
    };
    assert_eq!(vote(&above), Some(Side::Long));
    assert_eq!(vote(&below), Some(Side::Short));
}

#[test]
fn test_vote_abstains_on_the_level() {
    assert_eq!(vote(&snapshot(Timeframe::H1)), None);
}

#[test]
fn test_identical_votes_confirm() {
    let snaps = [
        bullish_snapshot(Timeframe::M15),
        bullish_snapshot(Timeframe::H1),
        bullish_snapshot(Timeframe::H4),
    ];
    assert_eq!(confirm(&snaps, ConfirmationMode::Strict), Ok(Side::Long));

    let snaps = [bearish_snapshot(Timeframe::M15), bearish_snapshot(Timeframe::H1)];
    assert_eq!(confirm(&snaps, ConfirmationMode::Strict), Ok(Side::Short));
}

#[test]
fn test_mixed_votes_conflict() {
    let snaps = [
        bullish_snapshot(Timeframe::M15),
        bearish_snapshot(Timeframe::H1),
        snapshot(Timeframe::H4),
    ];
    assert_eq!(
        confirm(&snaps, ConfirmationMode::Strict),
        Err(Rejection::DirectionConflict {
            votes: vec![
                (Timeframe::M15, Some(Side::Long)),
                (Timeframe::H1, Some(Side::Short)),
                (Timeframe::H4, None),
            ]
        })
    );
    // Lenient mode drops the abstain but long and short still disagree.
    assert!(confirm(&snaps, ConfirmationMode::Lenient).is_err());
}

#[test]
fn test_abstain_vetoes_only_in_strict_mode() {
    let snaps = [
        bullish_snapshot(Timeframe::M15),
        bullish_snapshot(Timeframe::H1),
        snapshot(Timeframe::H4),
    ];
    assert!(matches!(
        confirm(&snaps, ConfirmationMode::Strict),
        Err(Rejection::DirectionConflict { .. })
    ));
    assert_eq!(confirm(&snaps, ConfirmationMode::Lenient), Ok(Side::Long));
}

#[test]
fn test_no_timeframes_is_a_conflict() {
    assert_eq!(
        confirm(&[], ConfirmationMode::Strict),
        Err(Rejection::DirectionConflict { votes: vec![] })
    );
    let abstains = [snapshot(Timeframe::H1)];
    assert!(confirm(&abstains, ConfirmationMode::Lenient).is_err());
}

#[test]
fn test_trend_vote() {
    assert_eq!(trend_vote(&bullish_snapshot(Timeframe::H1)), TrendBias::Bullish);
    assert_eq!(trend_vote(&bearish_snapshot(Timeframe::H1)), TrendBias::Bearish);
    assert_eq!(trend_vote(&snapshot(Timeframe::H1)), TrendBias::Neutral);
    assert!(TrendBias::Bullish.matches(Side::Long));
    assert!(!TrendBias::Neutral.matches(Side::Short));
}
