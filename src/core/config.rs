use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::core::dispatch::BackendKind;
use crate::core::health::ThresholdConfig;
use crate::core::validation::{validate_api_key, validate_api_url, validate_percent};
use crate::error::{AgentError, Result};

/// Environment variable that overrides the default config location
pub const CONFIG_ENV_VAR: &str = "BEACON_AGENT_CONFIG";

fn default_api_type() -> String {
    "Simulated".to_string()
}

fn default_refresh_interval_seconds() -> u64 {
    10
}

fn default_notify_delay_minutes() -> u64 {
    10
}

fn default_notify_threshold_percent() -> f64 {
    90.0
}

/// Agent configuration, read once at startup from a JSON file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    pub agent: AgentSettings,
    #[serde(default)]
    pub smartctl: CollectorToggle,
    #[serde(default)]
    pub docker: CollectorToggle,
    #[serde(default)]
    pub proxmox: ProxmoxSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSettings {
    /// Report backend identifier ("Simulated", "UptimeKuma")
    #[serde(default = "default_api_type")]
    pub api_type: String,
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_refresh_interval_seconds")]
    pub refresh_interval_seconds: u64,
    /// Heartbeat interval while healthy
    #[serde(default = "default_notify_delay_minutes")]
    pub notify_delay_minutes: u64,
    #[serde(default = "default_notify_threshold_percent")]
    pub notify_threshold_percent: f64,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            api_type: default_api_type(),
            api_url: None,
            api_key: None,
            refresh_interval_seconds: default_refresh_interval_seconds(),
            notify_delay_minutes: default_notify_delay_minutes(),
            notify_threshold_percent: default_notify_threshold_percent(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectorToggle {
    #[serde(default)]
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProxmoxSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub token_id: Option<String>,
    #[serde(default)]
    pub token_secret: Option<String>,
}

impl AgentConfig {
    /// Load and validate the configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path).map_err(|e| {
            AgentError::config(format!(
                "Config file could not be read at {}: {}",
                path.display(),
                e
            ))
        })?;

        let config = Self::from_json(&data)?;
        log::info!("Read config file: {}", path.display());
        Ok(config)
    }

    /// Parse and validate configuration from JSON text.
    pub fn from_json(data: &str) -> Result<Self> {
        let config: AgentConfig = serde_json::from_str(data)
            .map_err(|e| AgentError::config(format!("Invalid configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve the config path: explicit argument, then the
    /// `BEACON_AGENT_CONFIG` variable, then the user config directory.
    pub fn resolve_path(explicit: Option<&str>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            return Ok(PathBuf::from(path));
        }
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            if !path.trim().is_empty() {
                return Ok(PathBuf::from(path));
            }
        }
        Self::default_path()
    }

    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| AgentError::config("Could not determine config directory"))?;

        Ok(config_dir.join("beacon-agent").join("config.json"))
    }

    /// Check required keys and value ranges.
    pub fn validate(&self) -> Result<()> {
        validate_percent(
            "notify_threshold_percent",
            self.agent.notify_threshold_percent,
        )?;

        if self.agent.refresh_interval_seconds == 0 {
            return Err(AgentError::config(
                "refresh_interval_seconds must be greater than 0",
            ));
        }

        if self.backend_kind() == BackendKind::UptimeKuma {
            self.push_endpoint()?;
        }

        if self.proxmox.enabled {
            self.proxmox_token()?;
        }

        Ok(())
    }

    /// Backend selected by `api_type` (unknown values fall back to Simulated)
    pub fn backend_kind(&self) -> BackendKind {
        BackendKind::from_api_type(&self.agent.api_type)
    }

    /// Validated push endpoint `(api_url, api_key)`
    pub fn push_endpoint(&self) -> Result<(Url, String)> {
        let url = self
            .agent
            .api_url
            .as_deref()
            .ok_or_else(|| AgentError::config("The key 'agent.api_url' is missing in the configuration"))?;
        let key = self
            .agent
            .api_key
            .as_deref()
            .ok_or_else(|| AgentError::config("The key 'agent.api_key' is missing in the configuration"))?;

        let url = validate_api_url(url)?;
        validate_api_key(key)?;
        Ok((url, key.trim().to_string()))
    }

    /// Proxmox API token `(token_id, token_secret)`
    pub fn proxmox_token(&self) -> Result<(String, String)> {
        let token_id = self.proxmox.token_id.as_deref().ok_or_else(|| {
            AgentError::config("The key 'proxmox.token_id' is missing in the configuration")
        })?;
        let token_secret = self.proxmox.token_secret.as_deref().ok_or_else(|| {
            AgentError::config("The key 'proxmox.token_secret' is missing in the configuration")
        })?;
        Ok((token_id.to_string(), token_secret.to_string()))
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.agent.refresh_interval_seconds)
    }

    pub fn resend_interval(&self) -> Duration {
        Duration::from_secs(self.agent.notify_delay_minutes.saturating_mul(60))
    }

    pub fn threshold_config(&self) -> ThresholdConfig {
        ThresholdConfig {
            percent_threshold: self.agent.notify_threshold_percent,
            resend_interval: self.resend_interval(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_applied() {
        let config = AgentConfig::from_json(r#"{ "agent": {} }"#).unwrap();

        assert_eq!(config.agent.api_type, "Simulated");
        assert_eq!(config.refresh_interval(), Duration::from_secs(10));
        assert_eq!(config.resend_interval(), Duration::from_secs(600));
        assert_eq!(config.threshold_config().percent_threshold, 90.0);
        assert!(!config.smartctl.enabled);
        assert!(!config.docker.enabled);
        assert!(!config.proxmox.enabled);
    }

    #[test]
    fn test_agent_section_is_required() {
        let err = AgentConfig::from_json("{}").unwrap_err();
        assert!(matches!(err, AgentError::Config(_)));
    }

    #[test]
    fn test_push_backend_requires_key() {
        let json = r#"{
            "agent": {
                "api_type": "UptimeKuma",
                "api_url": "https://kuma.example.com/api/push"
            }
        }"#;

        let err = AgentConfig::from_json(json).unwrap_err();
        assert!(err.to_string().contains("agent.api_key"));
    }

    #[test]
    fn test_push_backend_valid() {
        let json = r#"{
            "agent": {
                "api_type": "UptimeKuma",
                "api_url": "https://kuma.example.com/api/push",
                "api_key": "Ab12Cd",
                "notify_delay_minutes": 5,
                "notify_threshold_percent": 85
            }
        }"#;

        let config = AgentConfig::from_json(json).unwrap();
        assert_eq!(config.backend_kind(), BackendKind::UptimeKuma);
        assert_eq!(config.resend_interval(), Duration::from_secs(300));
        assert_eq!(config.threshold_config().percent_threshold, 85.0);

        let (url, key) = config.push_endpoint().unwrap();
        assert_eq!(url.as_str(), "https://kuma.example.com/api/push");
        assert_eq!(key, "Ab12Cd");
    }

    #[test]
    fn test_unknown_api_type_does_not_require_endpoint() {
        let config = AgentConfig::from_json(r#"{ "agent": { "api_type": "Zabbix" } }"#).unwrap();
        assert_eq!(config.backend_kind(), BackendKind::Simulated);
    }

    #[test]
    fn test_huge_notify_delay_saturates() {
        let json = r#"{ "agent": { "notify_delay_minutes": 18446744073709551615 } }"#;
        let config = AgentConfig::from_json(json).unwrap();
        assert_eq!(config.resend_interval(), Duration::from_secs(u64::MAX));
    }

    #[test]
    fn test_threshold_out_of_range() {
        let json = r#"{ "agent": { "notify_threshold_percent": 150 } }"#;
        assert!(AgentConfig::from_json(json).is_err());
    }

    #[test]
    fn test_proxmox_requires_token() {
        let json = r#"{ "agent": {}, "proxmox": { "enabled": true, "token_id": "root@pam!agent" } }"#;
        let err = AgentConfig::from_json(json).unwrap_err();
        assert!(err.to_string().contains("proxmox.token_secret"));
    }

    #[test]
    fn test_explicit_path_wins() {
        let path = AgentConfig::resolve_path(Some("/etc/beacon-agent.json")).unwrap();
        assert_eq!(path, PathBuf::from("/etc/beacon-agent.json"));
    }
}
