use beacon_agent::core::config::AgentConfig;
use beacon_agent::core::dispatch::{
    create_backend, summarize, DeliveryOutcome, ReportDispatcher, ReportStatus,
};
use beacon_agent::core::health::{evaluate, MetricsSnapshot, ThresholdConfig};
use std::time::Duration;

fn degraded_snapshot() -> MetricsSnapshot {
    MetricsSnapshot {
        cpu_load_percent: 97.2,
        memory_percent: 35.0,
        security_upgrade_count: 2,
        ..Default::default()
    }
}

#[test]
fn test_backend_selection_from_config() {
    let simulated = AgentConfig::from_json(r#"{ "agent": { "api_type": "Simulated" } }"#).unwrap();
    assert_eq!(create_backend(&simulated).unwrap().name(), "Simulated");

    let kuma = AgentConfig::from_json(
        r#"{ "agent": { "api_type": "uptime-kuma", "api_url": "https://kuma.example.com/api/push", "api_key": "k3y" } }"#,
    )
    .unwrap();
    assert_eq!(create_backend(&kuma).unwrap().name(), "UptimeKuma");
}

#[test]
fn test_summary_for_degraded_host() {
    let snapshot = degraded_snapshot();
    let verdict = evaluate(&snapshot, &ThresholdConfig::default());

    assert_eq!(
        summarize(&snapshot, &verdict),
        "CPU at 97.2%; Memory OK; 2 security updates"
    );
}

#[test]
fn test_simulated_dispatch_records_report() {
    let config = AgentConfig::from_json(r#"{ "agent": {} }"#).unwrap();
    let mut dispatcher = ReportDispatcher::from_config(&config).unwrap();

    let snapshot = degraded_snapshot();
    let verdict = evaluate(&snapshot, &ThresholdConfig::default());
    assert_eq!(ReportStatus::from_verdict(&verdict), ReportStatus::Down);

    let outcome = dispatcher.dispatch(&snapshot, &verdict, Duration::from_millis(120));
    assert_eq!(outcome, Some(DeliveryOutcome::Recorded));
}
