//! Per-symbol "no result" outcomes.

use crate::indicators::IndicatorError;
use crate::models::indicators::Timeframe;
use crate::models::signal::{Side, TrendLabel};
use crate::signals::risk::SizingError;
use thiserror::Error;

/// Why a symbol produced no signal this cycle. Never aborts a batch.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Rejection {
    #[error("insufficient history on {timeframe}: {source}")]
    InsufficientHistory {
        timeframe: Timeframe,
        source: IndicatorError,
    },

    #[error("timeframes disagree on direction: {}", format_votes(.votes))]
    DirectionConflict { votes: Vec<(Timeframe, Option<Side>)> },

    #[error("sizing failed: {0}")]
    SizingFailure(#[from] SizingError),

    #[error("upstream fetch failed{}: {message}", on_timeframe(.timeframe))]
    UpstreamFetchFailure {
        timeframe: Option<Timeframe>,
        message: String,
    },

    #[error("filtered: {reason}")]
    Filtered { reason: String },

    #[error("no tradable setup for regime {label}")]
    NoSetup { label: TrendLabel },
}

impl Rejection {
    /// Stable tag used for per-cycle tallies.
    pub fn kind(&self) -> &'static str {
        match self {
            Rejection::InsufficientHistory { .. } => "insufficient_history",
            Rejection::DirectionConflict { .. } => "direction_conflict",
            Rejection::SizingFailure(_) => "sizing_failure",
            Rejection::UpstreamFetchFailure { .. } => "upstream_fetch_failure",
            Rejection::Filtered { .. } => "filtered",
            Rejection::NoSetup { .. } => "no_setup",
        }
    }
}

fn on_timeframe(timeframe: &Option<Timeframe>) -> String {
    match timeframe {
        Some(tf) => format!(" on {}", tf),
        None => String::new(),
    }
}

fn format_votes(votes: &[(Timeframe, Option<Side>)]) -> String {
    if votes.is_empty() {
        return "no timeframes".to_string();
    }
    votes
        .iter()
        .map(|(tf, vote)| match vote {
            Some(side) => format!("{}={}", tf, side),
            None => format!("{}=abstain", tf),
        })
        .collect::<Vec<_>>()
        .join(", ")
}
