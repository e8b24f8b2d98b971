use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Directional stance for one symbol in one scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Long,
    Short,
}

impl Side {
    /// +1 for long, -1 for short.
    pub fn sign(&self) -> f64 {
        match self {
            Side::Long => 1.0,
            Side::Short => -1.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Long => "LONG",
            Side::Short => "SHORT",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse regime label derived from the dominant timeframe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrendLabel {
    StrongTrend,
    Trend,
    Swing,
    Scalp,
    MeanReversion,
}

impl TrendLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendLabel::StrongTrend => "Strong Trend",
            TrendLabel::Trend => "Trend",
            TrendLabel::Swing => "Swing",
            TrendLabel::Scalp => "Scalp",
            TrendLabel::MeanReversion => "Mean Reversion",
        }
    }
}

impl fmt::Display for TrendLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strategy family a signal originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    TrendFollowing,
    MeanReversion,
    ScalpBreakout,
}

impl Strategy {
    pub fn from_label(label: TrendLabel) -> Self {
        match label {
            TrendLabel::StrongTrend | TrendLabel::Trend | TrendLabel::Swing => {
                Strategy::TrendFollowing
            }
            TrendLabel::MeanReversion => Strategy::MeanReversion,
            TrendLabel::Scalp => Strategy::ScalpBreakout,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::TrendFollowing => "Trend",
            Strategy::MeanReversion => "Mean-Reversion",
            Strategy::ScalpBreakout => "Scalp Breakout",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Discrete order-book pressure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderBookBias {
    Buy,
    Sell,
    Neutral,
}

impl OrderBookBias {
    /// Threshold on `(bid - ask) / (bid + ask)`.
    pub const IMBALANCE_THRESHOLD: f64 = 0.1;

    pub fn from_depth(bid_volume: f64, ask_volume: f64) -> Self {
        let total = bid_volume + ask_volume;
        if total <= 0.0 {
            return OrderBookBias::Neutral;
        }
        let imbalance = (bid_volume - ask_volume) / total;
        if imbalance > Self::IMBALANCE_THRESHOLD {
            OrderBookBias::Buy
        } else if imbalance < -Self::IMBALANCE_THRESHOLD {
            OrderBookBias::Sell
        } else {
            OrderBookBias::Neutral
        }
    }

    pub fn favors(&self, side: Side) -> bool {
        matches!(
            (self, side),
            (OrderBookBias::Buy, Side::Long) | (OrderBookBias::Sell, Side::Short)
        )
    }
}

/// One scoring contribution, kept for explainability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalReason {
    pub description: String,
    pub weight: f64,
}

/// Engine output for one symbol in one scan cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub symbol: String,
    pub side: Side,
    pub trend_label: TrendLabel,
    pub strategy: Strategy,
    pub score: f64,
    pub entry: f64,
    pub take_profit: f64,
    pub stop_loss: f64,
    pub liquidation_level: f64,
    pub trailing_level: f64,
    pub position_size: f64,
    pub margin_used: f64,
    pub risk_reward: f64,
    pub forecast_pnl_pct: f64,
    pub market_price: f64,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub reasons: Vec<SignalReason>,
    pub timestamp: DateTime<Utc>,
}

impl Signal {
    /// Stable identifier for caller-side "already notified" sets.
    pub fn key(&self) -> String {
        format!(
            "{}:{}:{}",
            self.symbol,
            self.side.as_str(),
            self.timestamp.timestamp()
        )
    }
}
