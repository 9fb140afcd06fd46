use beacon_agent::core::config::AgentConfig;
use beacon_agent::core::dispatch::BackendKind;
use beacon_agent::AgentError;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

const FULL_CONFIG: &str = r#"{
    "agent": {
        "api_type": "UptimeKuma",
        "api_url": "https://kuma.example.com/api/push",
        "api_key": "abc123",
        "refresh_interval_seconds": 30,
        "notify_delay_minutes": 5,
        "notify_threshold_percent": 85
    },
    "smartctl": { "enabled": true },
    "docker": { "enabled": true },
    "proxmox": { "enabled": false }
}"#;

#[test]
fn test_load_full_config_from_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    fs::write(&path, FULL_CONFIG).unwrap();

    let config = AgentConfig::load(&path).unwrap();
    assert_eq!(config.backend_kind(), BackendKind::UptimeKuma);
    assert!(config.smartctl.enabled);
    assert!(config.docker.enabled);
    assert!(!config.proxmox.enabled);
    assert_eq!(config.refresh_interval(), Duration::from_secs(30));

    let thresholds = config.threshold_config();
    assert_eq!(thresholds.percent_threshold, 85.0);
    assert_eq!(thresholds.resend_interval, Duration::from_secs(300));
}

#[test]
fn test_missing_file_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let result = AgentConfig::load(&temp_dir.path().join("absent.json"));
    assert!(result.is_err());
}

#[test]
fn test_minimal_config_uses_defaults() {
    let config = AgentConfig::from_json(r#"{ "agent": {} }"#).unwrap();
    assert_eq!(config.backend_kind(), BackendKind::Simulated);
    assert_eq!(config.refresh_interval(), Duration::from_secs(10));
    assert_eq!(config.resend_interval(), Duration::from_secs(600));
    assert_eq!(config.agent.notify_threshold_percent, 90.0);
    assert!(!config.smartctl.enabled);
    assert!(!config.docker.enabled);
    assert!(!config.proxmox.enabled);
}

#[test]
fn test_push_monitor_without_key_is_fatal() {
    let json = r#"{ "agent": { "api_type": "UptimeKuma", "api_url": "https://kuma.example.com/api/push" } }"#;
    match AgentConfig::from_json(json) {
        Err(AgentError::Config(msg)) => assert!(msg.contains("agent.api_key")),
        other => panic!("expected config error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_unknown_api_type_falls_back_to_simulated() {
    let config = AgentConfig::from_json(r#"{ "agent": { "api_type": "Carrier Pigeon" } }"#).unwrap();
    assert_eq!(config.backend_kind(), BackendKind::Simulated);
}

#[test]
fn test_out_of_range_threshold_is_rejected() {
    let result = AgentConfig::from_json(r#"{ "agent": { "notify_threshold_percent": 150 } }"#);
    assert!(matches!(result, Err(AgentError::Config(_))));
}

#[test]
fn test_proxmox_requires_token() {
    let result = AgentConfig::from_json(r#"{ "agent": {}, "proxmox": { "enabled": true, "token_id": "root@pam!agent" } }"#);
    match result {
        Err(AgentError::Config(msg)) => assert!(msg.contains("proxmox.token_secret")),
        other => panic!("expected config error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_explicit_path_wins() {
    let path = AgentConfig::resolve_path(Some("/etc/beacon-agent/custom.json")).unwrap();
    assert_eq!(path.to_str(), Some("/etc/beacon-agent/custom.json"));
}
