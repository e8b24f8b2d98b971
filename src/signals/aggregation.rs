//! Cross-symbol aggregation: dedup, floor, sort, truncate

use crate::config::{DedupKey, RankingConfig};
use crate::models::signal::Signal;
use std::cmp::Ordering;
use std::collections::HashSet;

fn dedup_key(signal: &Signal, key: DedupKey) -> String {
    match key {
        DedupKey::Symbol => signal.symbol.clone(),
        DedupKey::SymbolStrategy => format!("{}:{}", signal.symbol, signal.strategy.as_str()),
    }
}

/// Rank signals for publication.
///
/// First occurrence wins on duplicate keys, so callers should pass signals
/// in universe order. Ties on score fall back to forecast PnL.
pub fn rank_signals(signals: Vec<Signal>, config: &RankingConfig) -> Vec<Signal> {
    let mut seen = HashSet::new();
    let mut ranked: Vec<Signal> = signals
        .into_iter()
        .filter(|s| seen.insert(dedup_key(s, config.dedup)))
        .filter(|s| s.score >= config.min_score)
        .collect();

    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| {
                b.forecast_pnl_pct
                    .partial_cmp(&a.forecast_pnl_pct)
                    .unwrap_or(Ordering::Equal)
            })
    });
    ranked.truncate(config.top_n);
    ranked
}
