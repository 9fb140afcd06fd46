use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One polling cycle worth of host signals.
///
/// Optional sections are `None` when their collector is disabled. A section
/// that is present but failed carries its own `error` instead.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub timestamp: i64, // Unix timestamp
    pub cpu_load_percent: f64,
    pub num_cpu_cores: usize,
    pub memory_percent: f64,
    pub disk_usage: Vec<FilesystemUsage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_average: Option<LoadAverage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<HostInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smart: Option<SmartSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing_disks: Option<MissingDevices>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docker_projects: Option<BTreeMap<String, Vec<ContainerState>>>,
    /// Set when `docker ps` itself failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docker_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxmox: Option<ProxmoxSection>,
    pub package_upgrade_count: u32,
    pub security_upgrade_count: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilesystemUsage {
    pub mount_point: String,
    pub used_percent: f64,
}

impl FilesystemUsage {
    pub fn new<S: Into<String>>(mount_point: S, used_percent: f64) -> Self {
        Self {
            mount_point: mount_point.into(),
            used_percent,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadAverage {
    pub one: f64,
    pub five: f64,
    pub fifteen: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostInfo {
    pub hostname: String,
    pub os: String,
    pub version: String,
    pub kernel: String,
    pub ipv4_addresses: Vec<String>,
    pub ipv6_addresses: Vec<String>,
}

/// S.M.A.R.T. self-assessment of a single device
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "NOK")]
    Nok,
    #[default]
    #[serde(rename = "unknown")]
    Unknown,
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Ok => write!(f, "OK"),
            HealthStatus::Nok => write!(f, "NOK"),
            HealthStatus::Unknown => write!(f, "unknown"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SmartRecord {
    pub health_status: HealthStatus,
    /// Whether extended attribute data could be read
    pub available: bool,
    pub is_nvme: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Raw attribute values as reported by the tool
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

impl SmartRecord {
    pub fn with_status(health_status: HealthStatus) -> Self {
        Self {
            health_status,
            available: true,
            ..Default::default()
        }
    }

    pub fn failed<S: Into<String>>(error: S) -> Self {
        Self {
            health_status: HealthStatus::Unknown,
            available: false,
            is_nvme: false,
            error: Some(error.into()),
            attributes: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SmartSection {
    /// Device path to record, sorted by path
    pub devices: BTreeMap<String, SmartRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SmartSection {
    pub fn failed<S: Into<String>>(error: S) -> Self {
        Self {
            devices: BTreeMap::new(),
            error: Some(error.into()),
        }
    }
}

/// Missing device indices per bus family, each list sorted ascending
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingDevices {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nvme: Vec<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sata: Vec<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sd: Vec<char>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sg: Vec<u32>,
}

impl MissingDevices {
    pub fn is_empty(&self) -> bool {
        self.nvme.is_empty() && self.sata.is_empty() && self.sd.is_empty() && self.sg.is_empty()
    }

    /// Non-empty families as `(family, comma separated indices)`
    pub fn families(&self) -> Vec<(&'static str, String)> {
        let mut families = Vec::new();
        if !self.nvme.is_empty() {
            families.push(("nvme", join_display(&self.nvme)));
        }
        if !self.sata.is_empty() {
            families.push(("sata", join_display(&self.sata)));
        }
        if !self.sd.is_empty() {
            families.push(("sd", join_display(&self.sd)));
        }
        if !self.sg.is_empty() {
            families.push(("sg", join_display(&self.sg)));
        }
        families
    }
}

fn join_display<T: std::fmt::Display>(values: &[T]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainerState {
    pub name: String,
    pub state: String,
}

impl ContainerState {
    pub fn new<S: Into<String>, T: Into<String>>(name: S, state: T) -> Self {
        Self {
            name: name.into(),
            state: state.into(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == "running"
    }
}

/// A Proxmox guest (QEMU VM or LXC container)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GuestState {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: String,
}

impl GuestState {
    pub fn new<S: Into<String>, T: Into<String>>(name: S, status: T) -> Self {
        Self {
            name: name.into(),
            status: status.into(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.status == "running"
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProxmoxSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node: Option<String>,
    pub vms: Vec<GuestState>,
    pub containers: Vec<GuestState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProxmoxSection {
    pub fn failed<S: Into<String>>(error: S) -> Self {
        Self {
            error: Some(error.into()),
            ..Default::default()
        }
    }
}
