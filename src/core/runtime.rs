//! One scan cycle over the symbol universe with a bounded worker pool.

use crate::config::{RankingConfig, RuntimeConfig};
use crate::models::signal::{OrderBookBias, Signal};
use crate::services::market_data::{
    MarketDataError, MarketDataProvider, OrderBookProvider, SymbolUniverse,
};
use crate::signals::aggregation::rank_signals;
use crate::signals::engine::{SignalEngine, TimeframeCandles};
use crate::signals::error::Rejection;
use chrono::{DateTime, Utc};
use futures_util::stream::{self, StreamExt};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("symbol universe unavailable: {0}")]
    UniverseUnavailable(#[source] MarketDataError),
}

/// Outcome of one cycle. Valid even when the cycle was cancelled part way.
#[derive(Debug, Clone)]
pub struct ScanReport {
    /// Ranked, deduplicated, truncated.
    pub signals: Vec<Signal>,
    pub universe_size: usize,
    pub evaluated: usize,
    pub produced: usize,
    /// Rejection counts keyed by [`Rejection::kind`].
    pub skipped: BTreeMap<&'static str, usize>,
    pub cancelled: bool,
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
}

impl ScanReport {
    pub fn skipped_total(&self) -> usize {
        self.skipped.values().sum()
    }
}

pub struct ScanRuntime {
    engine: SignalEngine,
    market_data: Arc<dyn MarketDataProvider>,
    universe: Arc<dyn SymbolUniverse>,
    order_book: Option<Arc<dyn OrderBookProvider>>,
    ranking: RankingConfig,
    config: RuntimeConfig,
}

impl ScanRuntime {
    pub fn new(
        engine: SignalEngine,
        market_data: Arc<dyn MarketDataProvider>,
        universe: Arc<dyn SymbolUniverse>,
        ranking: RankingConfig,
        config: RuntimeConfig,
    ) -> Self {
        Self {
            engine,
            market_data,
            universe,
            order_book: None,
            ranking,
            config,
        }
    }

    /// Score with order-book bias from this provider.
    pub fn with_order_book(mut self, provider: Arc<dyn OrderBookProvider>) -> Self {
        self.order_book = Some(provider);
        self
    }

    pub fn engine(&self) -> &SignalEngine {
        &self.engine
    }

    /// Run one cycle. Only an unavailable universe fails the cycle; every
    /// per-symbol problem is tallied in the report.
    ///
    /// `shutdown` is checked after each symbol; in-flight pipelines are
    /// dropped once it flips to `true`.
    pub async fn run_cycle(&self, shutdown: &watch::Receiver<bool>) -> Result<ScanReport, ScanError> {
        let started_at = Utc::now();
        let started = Instant::now();

        let symbols = self
            .universe
            .get_symbols(self.config.max_symbols)
            .await
            .map_err(ScanError::UniverseUnavailable)?;
        let universe_size = symbols.len();

        info!(
            symbols = universe_size,
            concurrency = self.config.concurrency,
            "scan cycle started"
        );

        let mut signals = Vec::new();
        let mut skipped: BTreeMap<&'static str, usize> = BTreeMap::new();
        let mut evaluated = 0;
        let mut cancelled = *shutdown.borrow();

        if !cancelled {
            // `buffered` yields in input order, so first-occurrence dedup follows the universe.
            let mut results = stream::iter(symbols)
                .map(|symbol| self.evaluate_symbol(symbol))
                .buffered(self.config.concurrency.max(1));

            while let Some((symbol, outcome)) = results.next().await {
                evaluated += 1;
                match outcome {
                    Ok(signal) => signals.push(signal),
                    Err(rejection) => {
                        debug!(symbol = %symbol, reason = rejection.kind(), detail = %rejection, "symbol skipped");
                        *skipped.entry(rejection.kind()).or_default() += 1;
                    }
                }
                if *shutdown.borrow() {
                    cancelled = true;
                    break;
                }
            }
        }

        let produced = signals.len();
        let signals = rank_signals(signals, &self.ranking);
        let report = ScanReport {
            signals,
            universe_size,
            evaluated,
            produced,
            skipped,
            cancelled,
            started_at,
            elapsed: started.elapsed(),
        };

        info!(
            evaluated = report.evaluated,
            produced = report.produced,
            ranked = report.signals.len(),
            skipped = report.skipped_total(),
            cancelled = report.cancelled,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "scan cycle finished"
        );
        Ok(report)
    }

    async fn evaluate_symbol(&self, symbol: String) -> (String, Result<Signal, Rejection>) {
        let limit = Duration::from_secs(self.config.symbol_timeout_seconds);
        let outcome = match tokio::time::timeout(limit, self.fetch_and_evaluate(&symbol)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(Rejection::UpstreamFetchFailure {
                timeframe: None,
                message: format!("timed out after {}s", limit.as_secs()),
            }),
        };
        (symbol, outcome)
    }

    async fn fetch_and_evaluate(&self, symbol: &str) -> Result<Signal, Rejection> {
        let mut candles = TimeframeCandles::new();
        for &timeframe in &self.engine.config().timeframes {
            let series = self
                .market_data
                .get_candles(symbol, timeframe, self.config.lookback)
                .await
                .map_err(|e| Rejection::UpstreamFetchFailure {
                    timeframe: Some(timeframe),
                    message: e.to_string(),
                })?;
            candles.insert(timeframe, series);
        }

        let bias = self.order_book_bias(symbol).await;
        self.engine.evaluate(symbol, &candles, bias)
    }

    /// A failed order-book fetch only removes the bias term from scoring.
    async fn order_book_bias(&self, symbol: &str) -> Option<OrderBookBias> {
        let provider = self.order_book.as_ref()?;
        match provider.get_order_book_bias(symbol).await {
            Ok(bias) => Some(bias),
            Err(e) => {
                debug!(symbol = %symbol, error = %e, "order book unavailable");
                None
            }
        }
    }
}
