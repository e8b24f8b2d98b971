//! Signal publication.
//!
//! Sinks receive the ranked signals of a cycle. Their failures are logged by
//! the caller and never feed back into the engine.

use crate::models::signal::Signal;
use async_trait::async_trait;
use std::fmt::Write;
use tracing::info;

#[async_trait]
pub trait SignalSink: Send + Sync {
    fn name(&self) -> &str;

    async fn publish(&self, signals: &[Signal]) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Plain-text block for one signal.
pub fn format_signal(signal: &Signal) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "==================== {} ====================", signal.symbol);
    let _ = writeln!(
        out,
        "TYPE: {}   STRATEGY: {}   SIDE: {}   SCORE: {:.1}%",
        signal.trend_label, signal.strategy, signal.side, signal.score
    );
    let _ = writeln!(
        out,
        "ENTRY: {:.6}   TP: {:.6}   SL: {:.6}",
        signal.entry, signal.take_profit, signal.stop_loss
    );
    let _ = writeln!(
        out,
        "MARKET: {:.6}   TRAIL: {:.6}   LIQ: {:.6}",
        signal.market_price, signal.trailing_level, signal.liquidation_level
    );
    let _ = writeln!(
        out,
        "SIZE: {:.4}   MARGIN: {:.2}   R:R {:.2}   FORECAST: {:.2}%",
        signal.position_size, signal.margin_used, signal.risk_reward, signal.forecast_pnl_pct
    );
    for reason in &signal.reasons {
        let _ = writeln!(out, "  {:+.1}  {}", reason.weight, reason.description);
    }
    let _ = writeln!(out, "TIME: {}", signal.timestamp.format("%Y-%m-%d %H:%M UTC"));
    out.push_str("=========================================================");
    out
}

/// Writes every signal to the tracing output.
#[derive(Debug, Clone, Default)]
pub struct LogSink;

#[async_trait]
impl SignalSink for LogSink {
    fn name(&self) -> &str {
        "log"
    }

    async fn publish(&self, signals: &[Signal]) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if signals.is_empty() {
            info!("no signals this cycle");
            return Ok(());
        }
        for (rank, signal) in signals.iter().enumerate() {
            info!(
                rank = rank + 1,
                symbol = %signal.symbol,
                side = %signal.side,
                score = signal.score,
                key = %signal.key(),
                "\n{}",
                format_signal(signal)
            );
        }
        Ok(())
    }
}
