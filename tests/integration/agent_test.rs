use beacon_agent::core::collectors::SnapshotSource;
use beacon_agent::core::dispatch::{ReportDispatcher, SimulatedBackend};
use beacon_agent::core::health::{
    Decision, HealthStatus, MetricsSnapshot, SendReason, SmartRecord, SmartSection,
    ThresholdConfig,
};
use beacon_agent::core::Agent;
use std::collections::VecDeque;
use std::sync::atomic::AtomicBool;
use std::sync::OnceLock;
use std::time::{Duration, Instant};

/// Replays prepared snapshots, repeating the last one
struct ScriptedSource {
    snapshots: VecDeque<MetricsSnapshot>,
    last: MetricsSnapshot,
}

impl ScriptedSource {
    fn new(snapshots: Vec<MetricsSnapshot>) -> Self {
        Self {
            snapshots: snapshots.into(),
            last: MetricsSnapshot::default(),
        }
    }
}

impl SnapshotSource for ScriptedSource {
    fn collect(&mut self) -> MetricsSnapshot {
        if let Some(next) = self.snapshots.pop_front() {
            self.last = next;
        }
        self.last.clone()
    }
}

fn at(secs: u64) -> Instant {
    static BASE: OnceLock<Instant> = OnceLock::new();
    *BASE.get_or_init(Instant::now) + Duration::from_secs(secs)
}

fn with_disks(paths: &[&str]) -> MetricsSnapshot {
    MetricsSnapshot {
        smart: Some(SmartSection {
            devices: paths
                .iter()
                .map(|p| (p.to_string(), SmartRecord::with_status(HealthStatus::Ok)))
                .collect(),
            error: None,
        }),
        ..Default::default()
    }
}

fn agent_for(snapshots: Vec<MetricsSnapshot>) -> Agent {
    Agent::new(
        Box::new(ScriptedSource::new(snapshots)),
        ThresholdConfig::default(),
        ReportDispatcher::new(Box::new(SimulatedBackend::new())),
        Duration::from_secs(10),
    )
}

#[test]
fn test_disk_dropping_out_triggers_breach_then_recovery() {
    let mut agent = agent_for(vec![
        with_disks(&["/dev/sda", "/dev/sdb", "/dev/sdc"]),
        with_disks(&["/dev/sda", "/dev/sdc"]),
        with_disks(&["/dev/sda", "/dev/sdc"]),
        with_disks(&["/dev/sda", "/dev/sdb", "/dev/sdc"]),
    ]);

    let first = agent.run_cycle(at(0));
    assert!(first.verdict.ok);
    assert_eq!(first.decision, Decision::Send(SendReason::Heartbeat));

    let dropped = agent.run_cycle(at(10));
    assert!(!dropped.verdict.ok);
    assert_eq!(dropped.verdict.reasons, vec!["Missing sd disks: b"]);
    assert_eq!(dropped.decision, Decision::Send(SendReason::Breach));
    assert!(dropped.delivery.is_some());

    let still_missing = agent.run_cycle(at(20));
    assert_eq!(still_missing.decision, Decision::Send(SendReason::Breach));
    assert!(still_missing.delivery.is_some());

    let back = agent.run_cycle(at(30));
    assert!(back.verdict.ok);
    assert_eq!(back.decision, Decision::Send(SendReason::Recovery));
}

#[test]
fn test_inspect_does_not_touch_scheduler() {
    let mut agent = agent_for(vec![MetricsSnapshot {
        cpu_load_percent: 99.0,
        ..Default::default()
    }]);

    let (_, verdict, _) = agent.inspect();
    assert!(!verdict.ok);
    assert_eq!(agent.scheduler().state().last_sent_at, None);
    assert!(!agent.scheduler().state().was_bad);
}

#[test]
fn test_run_exits_when_stopped() {
    let mut agent = agent_for(vec![MetricsSnapshot::default()]);
    let running = AtomicBool::new(false);
    assert!(agent.run(&running).is_ok());
}
