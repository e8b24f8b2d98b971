//! Scan cycles end-to-end over in-memory market data

use crate::test_utils::*;
use perpscan::config::{RankingConfig, RuntimeConfig};
use perpscan::core::runtime::ScanError;
use perpscan::core::scheduler::ScanScheduler;
use perpscan::models::signal::{OrderBookBias, Side};
use perpscan::reporting::SignalSink;
use perpscan::services::market_data::StaticMarketData;
use std::sync::Arc;
use tokio::sync::watch;
use tokio_test::{assert_err, assert_ok};

fn mixed_market() -> StaticMarketData {
    let data = StaticMarketData::new();
    let data = with_series(data, "BTCUSDT", &zigzag_up(120));
    let data = with_series(data, "ETHUSDT", &zigzag_down(120));
    let data = with_series(data, "ADAUSDT", &zigzag_up(30));
    with_series(data, "DOGEUSDT", &strictly_up(120))
}

const MIXED: [&str; 5] = ["BTCUSDT", "ETHUSDT", "XRPUSDT", "ADAUSDT", "DOGEUSDT"];

#[tokio::test]
async fn cycle_tallies_every_outcome() {
    let runtime = runtime(
        Arc::new(mixed_market()),
        &MIXED,
        RankingConfig::default(),
        RuntimeConfig::default(),
    );

    let report = assert_ok!(runtime.run_cycle(&not_cancelled()).await);

    assert_eq!(report.universe_size, 5);
    assert_eq!(report.evaluated, 5);
    assert_eq!(report.produced, 2);
    assert!(!report.cancelled);
    assert_eq!(report.skipped.get("upstream_fetch_failure"), Some(&1));
    assert_eq!(report.skipped.get("insufficient_history"), Some(&1));
    assert_eq!(report.skipped.get("filtered"), Some(&1));
    assert_eq!(report.skipped_total(), 3);

    let mut sides: Vec<_> = report
        .signals
        .iter()
        .map(|s| (s.symbol.as_str(), s.side))
        .collect();
    sides.sort_by_key(|(symbol, _)| *symbol);
    assert_eq!(sides, vec![("BTCUSDT", Side::Long), ("ETHUSDT", Side::Short)]);
    assert!(report.signals.windows(2).all(|w| w[0].score >= w[1].score));
}

#[tokio::test]
async fn ranking_dedups_and_truncates() {
    let data = with_series(StaticMarketData::new(), "BTCUSDT", &zigzag_up(120));
    let data = with_series(data, "ETHUSDT", &zigzag_down(120));
    let ranking = RankingConfig {
        top_n: 1,
        ..RankingConfig::default()
    };
    let runtime = runtime(
        Arc::new(data),
        &["BTCUSDT", "BTCUSDT", "ETHUSDT"],
        ranking,
        RuntimeConfig::default(),
    );

    let report = assert_ok!(runtime.run_cycle(&not_cancelled()).await);
    assert_eq!(report.produced, 3);
    assert_eq!(report.signals.len(), 1);
}

#[tokio::test]
async fn order_book_bias_feeds_scoring() {
    let data = with_series(StaticMarketData::new(), "ETHUSDT", &zigzag_down(120))
        .with_bias("ETHUSDT", OrderBookBias::Sell);
    let data = Arc::new(data);
    let runtime = runtime(
        data.clone(),
        &["ETHUSDT"],
        RankingConfig::default(),
        RuntimeConfig::default(),
    )
    .with_order_book(data);

    let report = assert_ok!(runtime.run_cycle(&not_cancelled()).await);
    let signal = &report.signals[0];
    assert!(signal.reasons.iter().any(|r| r.description.contains("Order book")));
}

#[tokio::test]
async fn order_book_failure_only_drops_bias() {
    let data = with_series(StaticMarketData::new(), "BTCUSDT", &zigzag_up(120));
    let runtime = runtime(
        Arc::new(data),
        &["BTCUSDT"],
        RankingConfig::default(),
        RuntimeConfig::default(),
    )
    .with_order_book(Arc::new(FailingOrderBook));

    let report = assert_ok!(runtime.run_cycle(&not_cancelled()).await);
    assert_eq!(report.signals.len(), 1);
    assert!(!report.signals[0]
        .reasons
        .iter()
        .any(|r| r.description.contains("Order book")));
}

#[tokio::test]
async fn empty_universe_fails_cycle() {
    let runtime = runtime(
        Arc::new(StaticMarketData::new()),
        &[],
        RankingConfig::default(),
        RuntimeConfig::default(),
    );
    let err = assert_err!(runtime.run_cycle(&not_cancelled()).await);
    assert!(matches!(err, ScanError::UniverseUnavailable(_)));
}

#[tokio::test]
async fn cancelled_before_start_evaluates_nothing() {
    let runtime = runtime(
        Arc::new(mixed_market()),
        &MIXED,
        RankingConfig::default(),
        RuntimeConfig::default(),
    );
    let (_tx, rx) = watch::channel(true);

    let report = assert_ok!(runtime.run_cycle(&rx).await);
    assert!(report.cancelled);
    assert_eq!(report.evaluated, 0);
    assert!(report.signals.is_empty());
}

#[tokio::test]
async fn cancellation_stops_remaining_symbols() {
    let (tx, rx) = watch::channel(false);
    let provider = CancellingProvider {
        inner: mixed_market(),
        shutdown: tx,
    };
    let config = RuntimeConfig {
        concurrency: 1,
        ..RuntimeConfig::default()
    };
    let runtime = runtime(Arc::new(provider), &MIXED, RankingConfig::default(), config);

    let report = assert_ok!(runtime.run_cycle(&rx).await);
    assert!(report.cancelled);
    assert_eq!(report.evaluated, 1);
    // The finished symbol is still reported.
    assert_eq!(report.signals.len(), 1);
    assert_eq!(report.signals[0].symbol, "BTCUSDT");
}

#[tokio::test]
async fn slow_symbol_times_out() {
    let config = RuntimeConfig {
        symbol_timeout_seconds: 1,
        ..RuntimeConfig::default()
    };
    let runtime = runtime(
        Arc::new(SlowProvider),
        &["BTCUSDT"],
        RankingConfig::default(),
        config,
    );

    let report = assert_ok!(runtime.run_cycle(&not_cancelled()).await);
    assert_eq!(report.evaluated, 1);
    assert_eq!(report.skipped.get("upstream_fetch_failure"), Some(&1));
}

#[tokio::test]
async fn scheduler_publishes_to_every_sink() {
    let data = with_series(StaticMarketData::new(), "BTCUSDT", &zigzag_up(120));
    let runtime = Arc::new(runtime(
        Arc::new(data),
        &["BTCUSDT"],
        RankingConfig::default(),
        RuntimeConfig::default(),
    ));
    let recording = Arc::new(RecordingSink::default());
    let sinks: Vec<Arc<dyn SignalSink>> = vec![Arc::new(FailingSink), recording.clone()];

    let scheduler = assert_ok!(ScanScheduler::new(runtime, sinks, 300));
    let report = assert_ok!(scheduler.run_once().await);

    assert_eq!(report.signals.len(), 1);
    assert_eq!(recording.batch_count(), 1);
    assert_eq!(recording.batches.lock().unwrap()[0][0].symbol, "BTCUSDT");
}

#[tokio::test]
async fn scheduler_starts_and_stops() {
    let runtime = Arc::new(runtime(
        Arc::new(StaticMarketData::new()),
        &["BTCUSDT"],
        RankingConfig::default(),
        RuntimeConfig::default(),
    ));
    let scheduler = assert_ok!(ScanScheduler::new(runtime, Vec::new(), 3600));

    assert!(!scheduler.is_running().await);
    scheduler.start().await;
    assert!(scheduler.is_running().await);
    scheduler.stop().await;
    assert!(!scheduler.is_running().await);
}

#[test]
fn zero_interval_disables_scheduler() {
    let runtime = Arc::new(runtime(
        Arc::new(StaticMarketData::new()),
        &["BTCUSDT"],
        RankingConfig::default(),
        RuntimeConfig::default(),
    ));
    assert!(ScanScheduler::new(runtime, Vec::new(), 0).is_err());
}

#[tokio::test]
async fn scheduler_recovers_after_stop() {
    let data = with_series(StaticMarketData::new(), "BTCUSDT", &zigzag_up(120));
    let runtime = Arc::new(runtime(
        Arc::new(data),
        &["BTCUSDT"],
        RankingConfig::default(),
        RuntimeConfig::default(),
    ));
    let recording = Arc::new(RecordingSink::default());
    let sinks: Vec<Arc<dyn SignalSink>> = vec![recording.clone()];
    let scheduler = assert_ok!(ScanScheduler::new(runtime, sinks, 3600));

    scheduler.start().await;
    scheduler.stop().await;

    let report = assert_ok!(scheduler.run_once().await);
    assert!(!report.cancelled);
    assert_eq!(report.evaluated, 1);
    assert_eq!(recording.batch_count(), 1);
    assert_eq!(recording.batches.lock().unwrap()[0].len(), 1);

    scheduler.start().await;
    assert!(scheduler.is_running().await);
    let report = assert_ok!(scheduler.run_once().await);
    assert!(!report.cancelled);
    scheduler.stop().await;
}

#[tokio::test]
async fn second_start_keeps_single_loop() {
    let runtime = Arc::new(runtime(
        Arc::new(StaticMarketData::new()),
        &["BTCUSDT"],
        RankingConfig::default(),
        RuntimeConfig::default(),
    ));
    let scheduler = assert_ok!(ScanScheduler::new(runtime, Vec::new(), 3600));

    scheduler.start().await;
    scheduler.start().await;
    assert!(scheduler.is_running().await);

    // One stop ends the only loop; the grace period is not needed.
    let stopped = tokio::time::timeout(std::time::Duration::from_secs(2), scheduler.stop()).await;
    assert!(stopped.is_ok());
    assert!(!scheduler.is_running().await);
}
