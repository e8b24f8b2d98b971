//! Signal evaluation: snapshots, confirmation, regime, sizing, scoring, ranking.

pub mod aggregation;
pub mod confirmation;
pub mod engine;
pub mod error;
pub mod regime;
pub mod risk;
pub mod scoring;
pub mod snapshot;

pub use aggregation::rank_signals;
pub use confirmation::{confirm, trend_vote, vote, TrendBias};
pub use engine::{SignalEngine, TimeframeCandles};
pub use error::Rejection;
pub use regime::{classify, classify_for_side};
pub use risk::{compute_trade_plan, SizingError, TradeLevels, TradePlan};
pub use scoring::{ScoreCard, ScoringInput};
pub use snapshot::SnapshotBuilder;
