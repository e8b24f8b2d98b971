//! Unit tests for confluence scoring

use crate::support::{assert_close, bearish_snapshot, bullish_snapshot};
use perpscan::config::EngineConfig;
use perpscan::models::indicators::{IndicatorSnapshot, Timeframe};
use perpscan::models::signal::{OrderBookBias, Side, Strategy};
use perpscan::signals::scoring::forecast_pnl_pct;
use perpscan::signals::{ScoreCard, ScoringInput, TrendBias};

fn score(
    side: Side,
    dominant: &IndicatorSnapshot,
    votes: &[TrendBias],
    order_book: Option<OrderBookBias>,
    risk_reward: f64,
) -> ScoreCard {
    ScoreCard::compute(
        &ScoringInput {
            side,
            dominant,
            trend_votes: votes,
            order_book,
            risk_reward,
            strategy: Strategy::TrendFollowing,
        },
        &EngineConfig::default(),
    )
}

fn weight_of(card: &ScoreCard, needle: &str) -> Option<f64> {
    card.reasons
        .iter()
        .find(|r| r.description.contains(needle))
        .map(|r| r.weight)
}

#[test]
fn test_all_categories_long() {
    let dominant = IndicatorSnapshot {
        close: 106.0,
        volume: 2000.0,
        atr_zscore: Some(2.0),
        ..bullish_snapshot(Timeframe::H1)
    };
    let votes = [TrendBias::Bullish; 3];
    let card = score(Side::Long, &dominant, &votes, Some(OrderBookBias::Buy), 2.5);

    // 20 trend + 10 rsi + 10 macd + 5 breakout + 10 volume + 10 atr + 10 book + 10 rr + 27 confidence
    assert_close(card.total(), 100.0, 1e-9);
    assert_eq!(weight_of(&card, "timeframes trend"), Some(20.0));
    assert_eq!(weight_of(&card, "Bollinger breakout"), Some(5.0));
    assert_eq!(weight_of(&card, "Order book"), Some(10.0));
    assert_close(weight_of(&card, "confidence").unwrap(), 27.0, 1e-9);
}

#[test]
fn test_minimal_confluence() {
    let dominant = IndicatorSnapshot {
        rsi: 55.0,
        macd_histogram: -0.1,
        ..bullish_snapshot(Timeframe::H1)
    };
    let votes = [TrendBias::Bullish, TrendBias::Neutral, TrendBias::Bearish];
    let card = score(Side::Long, &dominant, &votes, Some(OrderBookBias::Sell), 1.0);

    // rsi band 10 + confidence 27; one of three votes is no majority
    assert_close(card.total(), 37.0, 1e-9);
    assert_eq!(card.reasons.len(), 2);
}

#[test]
fn test_trend_majority() {
    let votes = [TrendBias::Bullish, TrendBias::Bullish, TrendBias::Neutral];
    let card = score(Side::Long, &bullish_snapshot(Timeframe::H1), &votes, None, 1.0);
    assert_eq!(weight_of(&card, "2/3 timeframes"), Some(10.0));
}

#[test]
fn test_rsi_extreme_penalty() {
    let overbought = IndicatorSnapshot {
        rsi: 72.0,
        ..bullish_snapshot(Timeframe::H1)
    };
    let card = score(Side::Long, &overbought, &[TrendBias::Bullish], None, 1.0);
    assert_eq!(weight_of(&card, "RSI overbought"), Some(-10.0));

    let oversold = IndicatorSnapshot {
        rsi: 25.0,
        ..bearish_snapshot(Timeframe::H1)
    };
    let card = score(Side::Short, &oversold, &[TrendBias::Bearish], None, 1.0);
    assert_eq!(weight_of(&card, "RSI oversold"), Some(-10.0));
}

#[test]
fn test_short_side_scoring() {
    let card = score(
        Side::Short,
        &bearish_snapshot(Timeframe::H1),
        &[TrendBias::Bearish, TrendBias::Bearish],
        Some(OrderBookBias::Sell),
        1.6,
    );
    // 20 trend + 10 rsi + 10 macd + 10 book + 5 rr + 27 confidence
    assert_close(card.total(), 82.0, 1e-9);
}

#[test]
fn test_score_is_clamped() {
    let mut config = EngineConfig::default();
    config.weights.confidence_weight = 0.0;
    config.weights.rsi_extreme_penalty = 50.0;
    let dominant = IndicatorSnapshot {
        rsi: 90.0,
        macd_histogram: -1.0,
        ..bullish_snapshot(Timeframe::H1)
    };
    let card = ScoreCard::compute(
        &ScoringInput {
            side: Side::Long,
            dominant: &dominant,
            trend_votes: &[],
            order_book: None,
            risk_reward: 0.5,
            strategy: Strategy::ScalpBreakout,
        },
        &config,
    );
    assert_eq!(card.total(), 0.0);
}

#[test]
fn test_forecast_pnl() {
    assert_close(forecast_pnl_pct(0.015, 90.0), 1.35, 1e-12);
}
