//! Additive confluence scoring

use crate::config::EngineConfig;
use crate::models::indicators::IndicatorSnapshot;
use crate::models::signal::{OrderBookBias, Side, SignalReason, Strategy};
use crate::signals::confirmation::TrendBias;

pub const MAX_SCORE: f64 = 100.0;

const RR_HIGH: f64 = 2.0;
const RR_MID: f64 = 1.5;

/// Everything the scorer looks at for one confirmed symbol.
#[derive(Debug, Clone)]
pub struct ScoringInput<'a> {
    pub side: Side,
    pub dominant: &'a IndicatorSnapshot,
    pub trend_votes: &'a [TrendBias],
    pub order_book: Option<OrderBookBias>,
    pub risk_reward: f64,
    pub strategy: Strategy,
}

/// Clamped score plus the contributions that produced it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreCard {
    raw: f64,
    pub reasons: Vec<SignalReason>,
}

impl ScoreCard {
    fn add(&mut self, weight: f64, description: impl Into<String>) {
        if weight == 0.0 {
            return;
        }
        self.raw += weight;
        self.reasons.push(SignalReason {
            description: description.into(),
            weight,
        });
    }

    /// Sum of contributions clamped to 0-100.
    pub fn total(&self) -> f64 {
        self.raw.clamp(0.0, MAX_SCORE)
    }

    pub fn compute(input: &ScoringInput<'_>, config: &EngineConfig) -> Self {
        let w = &config.weights;
        let snap = input.dominant;
        let side = input.side;
        let mut card = ScoreCard::default();

        let aligned = input.trend_votes.iter().filter(|v| v.matches(side)).count();
        let total = input.trend_votes.len();
        if total > 0 && aligned == total {
            card.add(w.trend_all, format!("All {} timeframes trend {}", total, side));
        } else if aligned * 2 > total {
            card.add(
                w.trend_majority,
                format!("{}/{} timeframes trend {}", aligned, total, side),
            );
        }

        let rsi = snap.rsi;
        let (in_band, extreme) = match side {
            Side::Long => (rsi > 50.0 && rsi < 65.0, rsi >= 70.0),
            Side::Short => (rsi > 35.0 && rsi < 50.0, rsi <= 30.0),
        };
        if in_band {
            card.add(w.rsi_band, format!("RSI {:.2} in {} band", rsi, side));
        } else if extreme {
            let label = match side {
                Side::Long => "overbought",
                Side::Short => "oversold",
            };
            card.add(-w.rsi_extreme_penalty, format!("RSI {} at {:.2}", label, rsi));
        }

        if snap.macd_histogram * side.sign() > 0.0 {
            card.add(
                w.macd_alignment,
                format!("MACD histogram {:.4} confirms {}", snap.macd_histogram, side),
            );
        }

        let breakout = match side {
            Side::Long => snap.is_above_upper_band(),
            Side::Short => snap.is_below_lower_band(),
        };
        if breakout {
            card.add(w.bollinger_breakout, "Bollinger breakout");
        } else {
            card.add(w.bollinger_inside, "Inside Bollinger bands");
        }

        if snap.has_volume_spike(config.volume_spike_multiplier) {
            card.add(
                w.volume_spike,
                format!("Volume spike {:.0} vs avg {:.0}", snap.volume, snap.volume_avg),
            );
        }
        if let Some(z) = snap.atr_zscore.filter(|z| z.abs() > config.atr_spike_zscore) {
            card.add(w.atr_spike, format!("ATR z-score {:.2}", z));
        }

        if let Some(bias) = input.order_book.filter(|b| b.favors(side)) {
            card.add(w.order_book, format!("Order book bias {:?}", bias));
        }

        if input.risk_reward >= RR_HIGH {
            card.add(w.rr_high, format!("Reward:risk {:.2}", input.risk_reward));
        } else if input.risk_reward >= RR_MID {
            card.add(w.rr_mid, format!("Reward:risk {:.2}", input.risk_reward));
        }

        let confidence = config.confidence.for_strategy(input.strategy);
        card.add(
            confidence * w.confidence_weight,
            format!("{} confidence {:.0}", input.strategy, confidence),
        );

        card
    }
}

/// Expected PnL in percent: take-profit distance weighted by confidence.
pub fn forecast_pnl_pct(take_profit_pct: f64, confidence: f64) -> f64 {
    take_profit_pct * 100.0 * confidence / 100.0
}
