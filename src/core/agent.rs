//! The monitoring loop.
//!
//! One cycle is collect, enrich, evaluate, schedule, and (maybe) dispatch.
//! The loop then sleeps for the refresh interval and starts over until the
//! shared `running` flag is cleared.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crate::core::collectors::{SnapshotCollector, SnapshotSource};
use crate::core::config::AgentConfig;
use crate::core::dispatch::{DeliveryOutcome, ReportDispatcher};
use crate::core::health::{
    enrich_with_missing_devices, evaluate, Decision, MetricsSnapshot, NotificationScheduler,
    ThresholdConfig, Verdict,
};
use crate::error::Result;

/// Granularity of the interruptible sleep between cycles
const SLEEP_SLICE: Duration = Duration::from_millis(250);

/// What happened during one cycle
#[derive(Debug, Clone)]
pub struct CycleOutcome {
    pub snapshot: MetricsSnapshot,
    pub verdict: Verdict,
    pub decision: Decision,
    /// `None` when nothing was sent or delivery failed
    pub delivery: Option<DeliveryOutcome>,
    /// Collection plus evaluation time, reported as ping
    pub latency: Duration,
}

pub struct Agent {
    source: Box<dyn SnapshotSource>,
    thresholds: ThresholdConfig,
    scheduler: NotificationScheduler,
    dispatcher: ReportDispatcher,
    refresh_interval: Duration,
}

impl Agent {
    pub fn new(
        source: Box<dyn SnapshotSource>,
        thresholds: ThresholdConfig,
        dispatcher: ReportDispatcher,
        refresh_interval: Duration,
    ) -> Self {
        Self {
            source,
            scheduler: NotificationScheduler::new(thresholds.resend_interval),
            thresholds,
            dispatcher,
            refresh_interval,
        }
    }

    /// Build collectors and the report backend from a validated configuration
    pub fn from_config(config: &AgentConfig) -> Result<Self> {
        let source = SnapshotCollector::from_config(config)?;
        let dispatcher = ReportDispatcher::from_config(config)?;
        Ok(Self::new(
            Box::new(source),
            config.threshold_config(),
            dispatcher,
            config.refresh_interval(),
        ))
    }

    pub fn scheduler(&self) -> &NotificationScheduler {
        &self.scheduler
    }

    pub fn backend_name(&self) -> &'static str {
        self.dispatcher.backend_name()
    }

    /// Collect and evaluate without touching the scheduler or the backend
    pub fn inspect(&mut self) -> (MetricsSnapshot, Verdict, Duration) {
        let start = Instant::now();
        let snapshot = enrich_with_missing_devices(self.source.collect());
        let verdict = evaluate(&snapshot, &self.thresholds);
        (snapshot, verdict, start.elapsed())
    }

    /// Run one full cycle as of `now`
    pub fn run_cycle(&mut self, now: Instant) -> CycleOutcome {
        let (snapshot, verdict, latency) = self.inspect();
        log::debug!(
            "Cycle evaluated in {:.3}s: ok={} reasons={}",
            latency.as_secs_f64(),
            verdict.ok,
            verdict.reasons.len()
        );

        let decision = self.scheduler.observe(&verdict, now);
        let delivery = match decision {
            Decision::Send(reason) => {
                log::info!("Sending report ({})", reason);
                self.dispatcher.dispatch(&snapshot, &verdict, latency)
            }
            Decision::Skip => None,
        };

        CycleOutcome {
            snapshot,
            verdict,
            decision,
            delivery,
            latency,
        }
    }

    /// Loop until `running` is cleared
    pub fn run(&mut self, running: &AtomicBool) -> Result<()> {
        log::info!(
            "Agent started, refreshing every {}s via {}",
            self.refresh_interval.as_secs(),
            self.dispatcher.backend_name()
        );

        while running.load(Ordering::SeqCst) {
            self.run_cycle(Instant::now());
            sleep_while_running(self.refresh_interval, running);
        }

        log::info!("Agent interrupted, shutting down");
        Ok(())
    }
}

fn sleep_while_running(total: Duration, running: &AtomicBool) {
    let deadline = Instant::now() + total;
    while running.load(Ordering::SeqCst) {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        thread::sleep(SLEEP_SLICE.min(deadline - now));
    }
}
