//! Per-symbol signal pipeline:
//! snapshots -> confirmation -> regime -> filters -> sizing -> scoring.

use crate::config::EngineConfig;
use crate::indicators::IndicatorError;
use crate::models::indicators::{Candle, IndicatorSnapshot, Timeframe};
use crate::models::signal::{OrderBookBias, Signal, Strategy, TrendLabel};
use crate::signals::confirmation::{confirm, trend_vote};
use crate::signals::error::Rejection;
use crate::signals::regime::classify_for_side;
use crate::signals::risk::compute_trade_plan;
use crate::signals::scoring::{forecast_pnl_pct, ScoreCard, ScoringInput};
use crate::signals::snapshot::SnapshotBuilder;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::debug;

/// Candle history per timeframe for one symbol.
pub type TimeframeCandles = HashMap<Timeframe, Vec<Candle>>;

/// Stateless evaluator holding immutable configuration.
#[derive(Debug, Clone)]
pub struct SignalEngine {
    config: EngineConfig,
    builder: SnapshotBuilder,
}

impl SignalEngine {
    pub fn new(config: EngineConfig) -> Self {
        let builder = SnapshotBuilder::new(config.indicators.clone());
        Self { config, builder }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Snapshot every configured timeframe, failing on the first one that
    /// lacks history.
    pub fn build_snapshots(
        &self,
        candles: &TimeframeCandles,
    ) -> Result<Vec<IndicatorSnapshot>, Rejection> {
        self.config
            .timeframes
            .iter()
            .map(|&timeframe| {
                let series = candles.get(&timeframe).map(Vec::as_slice).unwrap_or(&[]);
                self.builder
                    .build(timeframe, series)
                    .map_err(|source| Rejection::InsufficientHistory { timeframe, source })
            })
            .collect()
    }

    pub fn evaluate(
        &self,
        symbol: &str,
        candles: &TimeframeCandles,
        order_book: Option<OrderBookBias>,
    ) -> Result<Signal, Rejection> {
        let snapshots = self.build_snapshots(candles)?;
        let timestamp = candles
            .get(&self.config.dominant_timeframe)
            .and_then(|c| c.last())
            .map(|c| c.timestamp)
            .unwrap_or_else(Utc::now);

        self.evaluate_snapshots(symbol, &snapshots, order_book, timestamp)
    }

    pub fn evaluate_snapshots(
        &self,
        symbol: &str,
        snapshots: &[IndicatorSnapshot],
        order_book: Option<OrderBookBias>,
        timestamp: DateTime<Utc>,
    ) -> Result<Signal, Rejection> {
        let config = &self.config;

        let side = confirm(snapshots, config.confirmation)?;

        let dominant_tf = config.dominant_timeframe;
        let dominant = snapshots
            .iter()
            .find(|s| s.timeframe == dominant_tf)
            .ok_or(Rejection::InsufficientHistory {
                timeframe: dominant_tf,
                source: IndicatorError::InsufficientData {
                    indicator: "snapshot",
                    required: config.indicators.min_bars,
                    available: 0,
                },
            })?;

        let label = classify_for_side(dominant, side);
        if label == TrendLabel::Scalp
            && config.require_volume_spike_for_scalp
            && !dominant.has_volume_spike(config.volume_spike_multiplier)
        {
            return Err(Rejection::NoSetup { label });
        }

        self.apply_filters(dominant)?;

        let plan = compute_trade_plan(side, dominant, &config.risk)?;

        let trend_votes: Vec<_> = snapshots.iter().map(trend_vote).collect();
        let strategy = Strategy::from_label(label);
        let card = ScoreCard::compute(
            &ScoringInput {
                side,
                dominant,
                trend_votes: &trend_votes,
                order_book,
                risk_reward: plan.risk_reward,
                strategy,
            },
            config,
        );
        let confidence = config.confidence.for_strategy(strategy);

        let signal = Signal {
            symbol: symbol.to_string(),
            side,
            trend_label: label,
            strategy,
            score: card.total(),
            entry: plan.levels.entry,
            take_profit: plan.levels.take_profit,
            stop_loss: plan.levels.stop_loss,
            liquidation_level: plan.levels.liquidation,
            trailing_level: plan.levels.trailing,
            position_size: plan.position_size,
            margin_used: plan.margin_used,
            risk_reward: plan.risk_reward,
            forecast_pnl_pct: forecast_pnl_pct(config.risk.take_profit_pct, confidence),
            market_price: dominant.close,
            reasons: card.reasons,
            timestamp,
        };

        debug!(
            symbol = %symbol,
            side = %signal.side,
            label = %signal.trend_label,
            score = signal.score,
            "signal produced"
        );
        Ok(signal)
    }

    fn apply_filters(&self, dominant: &IndicatorSnapshot) -> Result<(), Rejection> {
        let filters = &self.config.filters;

        if let Some(min_volume) = filters.min_volume {
            if dominant.volume < min_volume {
                return Err(Rejection::Filtered {
                    reason: format!("volume {:.2} below minimum {:.2}", dominant.volume, min_volume),
                });
            }
        }
        if let Some(min_atr_pct) = filters.min_atr_pct {
            let atr_pct = dominant.atr_pct();
            if atr_pct < min_atr_pct {
                return Err(Rejection::Filtered {
                    reason: format!("ATR {:.5} of price below minimum {:.5}", atr_pct, min_atr_pct),
                });
            }
        }
        if let Some((low, high)) = filters.rsi_zone {
            if !(dominant.rsi > low && dominant.rsi < high) {
                return Err(Rejection::Filtered {
                    reason: format!("RSI {:.2} outside ({}, {})", dominant.rsi, low, high),
                });
            }
        }
        Ok(())
    }
}
