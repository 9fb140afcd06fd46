use beacon_agent::core::health::{
    enrich_with_missing_devices, evaluate, Check, ContainerState, FilesystemUsage, GuestState,
    HealthStatus, MetricsSnapshot, ProxmoxSection, SmartRecord, SmartSection, ThresholdConfig,
};
use std::collections::BTreeMap;

fn thresholds() -> ThresholdConfig {
    ThresholdConfig::default()
}

fn smart_section(devices: &[(&str, HealthStatus)]) -> SmartSection {
    SmartSection {
        devices: devices
            .iter()
            .map(|(path, status)| (path.to_string(), SmartRecord::with_status(*status)))
            .collect(),
        error: None,
    }
}

#[test]
fn test_healthy_host_is_ok() {
    let snapshot = MetricsSnapshot {
        cpu_load_percent: 12.0,
        memory_percent: 40.0,
        disk_usage: vec![FilesystemUsage::new("/", 55.0)],
        ..Default::default()
    };

    let verdict = evaluate(&snapshot, &thresholds());
    assert!(verdict.ok);
    assert!(verdict.reasons.is_empty());
    assert!(verdict.hard_error.is_none());
}

#[test]
fn test_fullest_filesystem_is_reported() {
    let snapshot = MetricsSnapshot {
        disk_usage: vec![
            FilesystemUsage::new("/", 91.0),
            FilesystemUsage::new("/srv", 97.5),
            FilesystemUsage::new("/boot", 30.0),
        ],
        ..Default::default()
    };

    let verdict = evaluate(&snapshot, &thresholds());
    assert!(!verdict.ok);
    assert_eq!(verdict.reasons, vec!["Disk threshold reached at /srv at 97.5% used"]);
}

#[test]
fn test_missing_disk_gap_fails_the_verdict() {
    let snapshot = MetricsSnapshot {
        smart: Some(smart_section(&[
            ("/dev/sda", HealthStatus::Ok),
            ("/dev/sdc", HealthStatus::Ok),
        ])),
        ..Default::default()
    };

    let snapshot = enrich_with_missing_devices(snapshot);
    let verdict = evaluate(&snapshot, &thresholds());

    assert!(!verdict.ok);
    assert!(verdict.failed(Check::MissingDisks));
    assert_eq!(verdict.reasons, vec!["Missing sd disks: b"]);
}

#[test]
fn test_failing_drive_and_stopped_guests() {
    let mut projects = BTreeMap::new();
    projects.insert(
        "media".to_string(),
        vec![
            ContainerState::new("media-jellyfin-1", "running"),
            ContainerState::new("media-sonarr-1", "restarting"),
        ],
    );

    let snapshot = MetricsSnapshot {
        smart: Some(smart_section(&[
            ("/dev/nvme0", HealthStatus::Ok),
            ("/dev/nvme1", HealthStatus::Nok),
        ])),
        docker_projects: Some(projects),
        proxmox: Some(ProxmoxSection {
            node: Some("pve".to_string()),
            vms: vec![GuestState::new("win11", "stopped")],
            containers: vec![GuestState::new("pihole", "running")],
            error: None,
        }),
        ..Default::default()
    };

    let verdict = evaluate(&enrich_with_missing_devices(snapshot), &thresholds());
    assert_eq!(
        verdict.reasons,
        vec![
            "S.M.A.R.T. status of /dev/nvme1 is NOK",
            "Container media-sonarr-1 in project media is restarting",
            "VM win11 is stopped",
        ]
    );
}

#[test]
fn test_collector_failures_are_hard_errors() {
    let snapshot = MetricsSnapshot {
        smart: Some(SmartSection::failed("smartctl command is not available.")),
        proxmox: Some(ProxmoxSection::failed("Unauthorized access: 401")),
        ..Default::default()
    };

    let verdict = evaluate(&snapshot, &thresholds());
    assert!(!verdict.ok);
    assert!(verdict.reasons.is_empty());
    assert_eq!(
        verdict.hard_error.as_deref(),
        Some("S.M.A.R.T.: smartctl command is not available.; Proxmox: Unauthorized access: 401")
    );
}

#[test]
fn test_docker_failure_is_a_hard_error() {
    let snapshot = MetricsSnapshot {
        docker_error: Some("Permission denied: docker ps --all --format {{json .}}".to_string()),
        ..Default::default()
    };

    let verdict = evaluate(&snapshot, &thresholds());
    assert!(!verdict.ok);
    assert!(verdict.reasons.is_empty());
    assert_eq!(
        verdict.hard_error.as_deref(),
        Some("Docker: Permission denied: docker ps --all --format {{json .}}")
    );
}

#[test]
fn test_lower_threshold_catches_more() {
    let snapshot = MetricsSnapshot {
        memory_percent: 75.0,
        ..Default::default()
    };

    assert!(evaluate(&snapshot, &thresholds()).ok);

    let strict = ThresholdConfig {
        percent_threshold: 70.0,
        ..Default::default()
    };
    let verdict = evaluate(&snapshot, &strict);
    assert_eq!(verdict.reasons, vec!["Memory threshold reached at 75%"]);
}
