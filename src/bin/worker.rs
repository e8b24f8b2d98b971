//! Perpscan Worker
//!
//! Scans the Bybit linear perpetual universe on a fixed interval and logs the
//! ranked signals of every cycle.

use dotenvy::dotenv;
use perpscan::config::{get_environment, ScannerConfig};
use perpscan::core::runtime::ScanRuntime;
use perpscan::core::scheduler::ScanScheduler;
use perpscan::logging;
use perpscan::reporting::{LogSink, SignalSink};
use perpscan::services::bybit::{BybitMarketDataProvider, BybitRestClient};
use perpscan::services::market_data::{StaticSymbolUniverse, SymbolUniverse};
use perpscan::signals::SignalEngine;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env if present
    dotenv().ok();

    logging::init_logging();

    let config = ScannerConfig::from_env()?;
    let env = get_environment();
    info!("Starting Perpscan Worker");
    info!(environment = %env, "Environment");
    info!(
        timeframes = ?config.engine.timeframes,
        dominant = %config.engine.dominant_timeframe,
        interval = config.runtime.interval_seconds,
        concurrency = config.runtime.concurrency,
        top_n = config.ranking.top_n,
        "Scanner configuration loaded"
    );

    let client = BybitRestClient::new(config.runtime.bybit_base_url.clone())?;
    let bybit = Arc::new(BybitMarketDataProvider::new(client));

    let universe: Arc<dyn SymbolUniverse> = if config.runtime.symbols.is_empty() {
        info!(max_symbols = config.runtime.max_symbols, "Universe: top USDT perpetuals by turnover");
        bybit.clone()
    } else {
        info!(symbols = ?config.runtime.symbols, "Universe: fixed symbol list");
        Arc::new(StaticSymbolUniverse::new(config.runtime.symbols.clone()))
    };

    let mut runtime = ScanRuntime::new(
        SignalEngine::new(config.engine.clone()),
        bybit.clone(),
        universe,
        config.ranking.clone(),
        config.runtime.clone(),
    );
    if config.runtime.use_order_book {
        runtime = runtime.with_order_book(bybit.clone());
    }

    let sinks: Vec<Arc<dyn SignalSink>> = vec![Arc::new(LogSink)];
    let scheduler = ScanScheduler::new(Arc::new(runtime), sinks, config.runtime.interval_seconds)?;

    // First cycle right away, then on the cron schedule.
    if let Err(e) = scheduler.run_once().await {
        warn!(error = %e, "Initial scan failed, waiting for next tick");
    }
    scheduler.start().await;

    info!("Worker started, waiting for shutdown signal...");
    signal::ctrl_c().await?;
    info!("Shutting down worker...");
    scheduler.stop().await;
    info!("Worker stopped");

    Ok(())
}
