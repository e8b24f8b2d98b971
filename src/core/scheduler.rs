//! Cron-based scheduler running scan cycles and publishing their signals

use crate::core::runtime::{ScanError, ScanReport, ScanRuntime};
use crate::reporting::SignalSink;
use cron::Schedule;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{watch, RwLock};
use tokio::time::Duration;
use tracing::{error, info, warn};

/// How long `stop` waits for a running cycle before aborting it.
const STOP_GRACE: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("scheduler disabled: interval_seconds is 0")]
    Disabled,

    #[error("invalid cron expression '{expr}': {message}")]
    InvalidCron { expr: String, message: String },
}

/// Whether `interval_to_cron` fires exactly every `interval_seconds`.
///
/// Cron steps restart at each minute, hour or day boundary, so the step must
/// divide that boundary and larger intervals must be whole minutes or hours.
pub fn interval_is_exact(interval_seconds: u64) -> bool {
    match interval_seconds {
        0 => false,
        s if s >= 3600 => s % 3600 == 0 && 24 % (s / 3600) == 0,
        s if s >= 60 => s % 60 == 0 && 60 % (s / 60) == 0,
        s => 60 % s == 0,
    }
}

/// Cron expression (with seconds) firing every `interval_seconds`.
///
/// Intervals for which [`interval_is_exact`] is false are rounded down to
/// the enclosing unit and restart at each boundary.
pub fn interval_to_cron(interval_seconds: u64) -> String {
    // second minute hour day month weekday
    if interval_seconds >= 3600 {
        format!("0 0 */{} * * *", interval_seconds / 3600)
    } else if interval_seconds >= 60 {
        format!("0 */{} * * * *", interval_seconds / 60)
    } else {
        format!("*/{} * * * * *", interval_seconds)
    }
}

pub struct ScanScheduler {
    runtime: Arc<ScanRuntime>,
    sinks: Arc<Vec<Arc<dyn SignalSink>>>,
    schedule: Schedule,
    shutdown: watch::Sender<bool>,
    handle: Arc<RwLock<Option<tokio::task::JoinHandle<()>>>>,
}

impl ScanScheduler {
    pub fn new(
        runtime: Arc<ScanRuntime>,
        sinks: Vec<Arc<dyn SignalSink>>,
        interval_seconds: u64,
    ) -> Result<Self, SchedulerError> {
        if interval_seconds == 0 {
            return Err(SchedulerError::Disabled);
        }

        let cron_expr = interval_to_cron(interval_seconds);
        if !interval_is_exact(interval_seconds) {
            warn!(
                interval = interval_seconds,
                cron = %cron_expr,
                "ScanScheduler: interval does not map onto an even cron step, ticks will drift"
            );
        }
        let schedule = Schedule::from_str(&cron_expr).map_err(|e| SchedulerError::InvalidCron {
            expr: cron_expr.clone(),
            message: e.to_string(),
        })?;

        info!(
            interval = interval_seconds,
            cron = %cron_expr,
            sinks = sinks.len(),
            "ScanScheduler: created"
        );

        let (shutdown, _) = watch::channel(false);
        Ok(Self {
            runtime,
            sinks: Arc::new(sinks),
            schedule,
            shutdown,
            handle: Arc::new(RwLock::new(None)),
        })
    }

    /// Run a single cycle now and publish its signals.
    ///
    /// A previous `stop` does not cancel manual cycles once the loop is gone.
    pub async fn run_once(&self) -> Result<ScanReport, ScanError> {
        if !self.is_running().await {
            self.shutdown.send_replace(false);
        }
        let shutdown = self.shutdown.subscribe();
        run_and_publish(&self.runtime, &self.sinks, &shutdown).await
    }

    /// Start the scheduler. A no-op while a loop is already running.
    pub async fn start(&self) {
        let mut h = self.handle.write().await;
        if h.as_ref().is_some_and(|handle| !handle.is_finished()) {
            warn!("ScanScheduler: already running");
            return;
        }
        self.shutdown.send_replace(false);

        let runtime = self.runtime.clone();
        let sinks = self.sinks.clone();
        let schedule = self.schedule.clone();
        let mut shutdown = self.shutdown.subscribe();

        let handle = tokio::spawn(async move {
            info!("ScanScheduler: started, waiting for cron schedule...");

            loop {
                let Some(next_tick) = schedule.upcoming(chrono::Utc).next() else {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    continue;
                };
                let wait = (next_tick - chrono::Utc::now()).to_std().unwrap_or_default();

                tokio::select! {
                    _ = tokio::time::sleep(wait) => {}
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            break;
                        }
                        continue;
                    }
                }

                match run_and_publish(&runtime, &sinks, &shutdown).await {
                    Ok(_) => {}
                    Err(e) => {
                        error!(error = %e, "ScanScheduler: cycle failed, retrying at next tick");
                    }
                }

                if *shutdown.borrow() {
                    break;
                }
            }

            info!("ScanScheduler: loop exited");
        });

        *h = Some(handle);
        info!("ScanScheduler: started successfully");
    }

    /// Signal cancellation and wait briefly for the current cycle to wind down.
    pub async fn stop(&self) {
        self.shutdown.send_replace(true);
        let mut handle = self.handle.write().await;
        if let Some(mut h) = handle.take() {
            if tokio::time::timeout(STOP_GRACE, &mut h).await.is_err() {
                warn!("ScanScheduler: cycle did not finish in time, aborting");
                h.abort();
            }
            info!("ScanScheduler: stopped");
        }
    }

    /// Check if the scheduler is running
    pub async fn is_running(&self) -> bool {
        let handle = self.handle.read().await;
        handle.is_some()
    }
}

async fn run_and_publish(
    runtime: &ScanRuntime,
    sinks: &[Arc<dyn SignalSink>],
    shutdown: &watch::Receiver<bool>,
) -> Result<ScanReport, ScanError> {
    let report = runtime.run_cycle(shutdown).await?;

    if report.cancelled && report.evaluated == 0 {
        info!("ScanScheduler: cycle cancelled before any symbol, nothing published");
        return Ok(report);
    }
    for sink in sinks {
        if let Err(e) = sink.publish(&report.signals).await {
            error!(sink = sink.name(), error = %e, "failed to publish signals");
        }
    }
    Ok(report)
}
