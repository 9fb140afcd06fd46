//! S.M.A.R.T. data through `smartctl` and `nvme-cli`.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::fs;

use super::{find_tool, run_command, CommandOutput};
use crate::core::health::{HealthStatus, SmartRecord, SmartSection};
use crate::error::AgentError;

static SATA_DEVICE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/dev/sata[0-9]+$").expect("valid sata device pattern"));
static SD_DEVICE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/dev/sd[a-z]$").expect("valid sd device pattern"));
static SG_DEVICE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/dev/sg[0-9]+$").expect("valid sg device pattern"));
static NVME_DEVICE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/dev/nvme[0-9]+$").expect("valid nvme device pattern"));

const SMARTCTL_MISSING: &str = "smartctl command is not available. Please install smartmontools.";
const NVME_MISSING: &str =
    "nvme command is not available, yet NVME drives were detected! Please install nvme-cli.";
const NO_SELF_TEST_LOG: &str = "Device does not support Self Test logging";

// smartctl exit status bits: 0 = command line did not parse, 1 = device open failed
const SMARTCTL_FATAL_BITS: i32 = 0b11;

/// Reads S.M.A.R.T. health for every disk device on the host
#[derive(Debug, Default)]
pub struct SmartCollector {
    use_ansi: bool,
}

impl SmartCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn collect(&mut self) -> SmartSection {
        if find_tool("smartctl").is_none() {
            return SmartSection::failed(SMARTCTL_MISSING);
        }

        let devices = list_devices();
        log::debug!("Getting S.M.A.R.T. data for devices: {:?}", devices);

        let has_nvme = devices.iter().any(|d| d.starts_with("/dev/nvme"));
        if has_nvme && find_tool("nvme").is_none() {
            return SmartSection::failed(NVME_MISSING);
        }

        let mut section = SmartSection::default();
        for device in devices {
            let record = if device.starts_with("/dev/nvme") {
                self.read_nvme_status(&device)
            } else {
                read_smartctl(&device)
            };
            section.devices.insert(device, record);
        }
        section
    }

    fn read_nvme_status(&mut self, device: &str) -> SmartRecord {
        log::debug!("Getting NVME status data for {}...", device);

        let envs: &[(&str, &str)] = if self.use_ansi { &[("LANG", "ANSI")] } else { &[] };
        let output = match run_command("nvme", &["smart-log", device], envs) {
            Ok(output) => output,
            Err(e) => return SmartRecord::failed(e.to_string()),
        };

        if !output.success() {
            if output.stderr.contains("Permission denied") {
                return SmartRecord::failed(permission_denied(device));
            }
            return SmartRecord::failed(format!(
                "Failed to retrieve status for {}: {}",
                device,
                output.stderr.trim()
            ));
        }

        // Localized output occasionally is not valid UTF-8; ask for plain output next time
        if output.stdout.contains(char::REPLACEMENT_CHARACTER) && !self.use_ansi {
            log::warn!("nvme output for {} was not valid UTF-8, switching to LANG=ANSI", device);
            self.use_ansi = true;
        }

        parse_nvme_smart_log(&output.stdout)
    }
}

fn permission_denied(device: &str) -> String {
    format!(
        "Permission denied when accessing {}. Please run as superuser.",
        device
    )
}

fn read_smartctl(device: &str) -> SmartRecord {
    log::debug!("Getting S.M.A.R.T. data for {}...", device);

    let health = match run_command("smartctl", &["-H", device], &[]) {
        Ok(output) => output,
        Err(AgentError::PermissionDenied(_)) => return SmartRecord::failed(permission_denied(device)),
        Err(e) => return SmartRecord::failed(e.to_string()),
    };

    if let Some(error) = smartctl_failure(&health) {
        if error.contains("Permission denied") {
            return SmartRecord::failed(permission_denied(device));
        }
        return SmartRecord::failed(error);
    }

    let mut record = SmartRecord {
        health_status: parse_health_status(&health.stdout),
        ..Default::default()
    };

    let details = match run_command("smartctl", &["-a", device], &[]) {
        Ok(output) => output,
        Err(e) => return SmartRecord::failed(e.to_string()),
    };

    if !details.success() && details.stdout.contains(NO_SELF_TEST_LOG) {
        record.available = false;
        return record;
    }
    if let Some(error) = smartctl_failure(&details) {
        return SmartRecord {
            error: Some(error),
            ..record
        };
    }

    record.available = true;
    record.attributes = parse_attribute_table(&details.stdout);
    record
}

fn smartctl_failure(output: &CommandOutput) -> Option<String> {
    match output.code {
        Some(code) if code & SMARTCTL_FATAL_BITS != 0 => Some(output.diagnostic().to_string()),
        Some(_) => None,
        None => Some("smartctl was terminated by a signal".to_string()),
    }
}

/// Health verdict from `smartctl -H` output
pub fn parse_health_status(output: &str) -> HealthStatus {
    let passed = output.lines().any(|line| {
        let line = line.trim();
        line == "SMART Health Status: OK"
            || (line.contains("SMART overall-health self-assessment test result")
                && line.contains("PASSED"))
    });

    if passed {
        HealthStatus::Ok
    } else {
        HealthStatus::Nok
    }
}

/// Attribute name to raw value, from the `smartctl -a` attribute table
pub fn parse_attribute_table(output: &str) -> BTreeMap<String, String> {
    output
        .lines()
        .filter(|line| !line.starts_with("ID#") && !line.trim().is_empty())
        .filter_map(|line| {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() > 9 && parts[0].parse::<u32>().is_ok() {
                Some((parts[1].to_string(), parts[9].to_string()))
            } else {
                None
            }
        })
        .collect()
}

/// Health record from `nvme smart-log` output (`key : value` lines)
pub fn parse_nvme_smart_log(output: &str) -> SmartRecord {
    let attributes: BTreeMap<String, String> = output
        .lines()
        .filter_map(|line| line.split_once(':'))
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .filter(|(key, _)| !key.is_empty())
        .collect();

    let critical_warning = attributes
        .get("critical_warning")
        .map(|v| parse_leading_number(v));

    let health_status = match critical_warning {
        Some(Some(0)) => HealthStatus::Ok,
        _ => HealthStatus::Nok,
    };

    SmartRecord {
        health_status,
        available: true,
        is_nvme: true,
        error: None,
        attributes,
    }
}

fn parse_leading_number(value: &str) -> Option<u64> {
    let value = value.trim();
    if value.is_empty() {
        return Some(0);
    }
    if let Some(hex) = value.strip_prefix("0x") {
        return u64::from_str_radix(hex.split_whitespace().next()?, 16).ok();
    }
    value.split_whitespace().next()?.parse().ok()
}

/// Candidate disk devices from `/dev`
fn list_devices() -> Vec<String> {
    let entries = match fs::read_dir("/dev") {
        Ok(entries) => entries,
        Err(e) => {
            log::error!("Could not list /dev: {}", e);
            return Vec::new();
        }
    };

    let names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| format!("/dev/{}", entry.file_name().to_string_lossy()))
        .collect();

    select_devices(&names)
}

/// Pick the devices to query.
///
/// `/dev/sata*` is preferred; without it `/dev/sd[a-z]`, then `/dev/sg*`.
/// NVMe controllers are always added, partitions and fabrics excluded.
pub fn select_devices(paths: &[String]) -> Vec<String> {
    let matching = |pattern: &Regex| -> Vec<String> {
        let mut found: Vec<String> = paths.iter().filter(|p| pattern.is_match(p)).cloned().collect();
        found.sort();
        found
    };

    let mut devices = matching(&SATA_DEVICE);
    if devices.is_empty() {
        devices = matching(&SD_DEVICE);
    }
    if devices.is_empty() {
        devices = matching(&SG_DEVICE);
    }
    devices.extend(
        matching(&NVME_DEVICE)
            .into_iter()
            .filter(|d| !d.contains("fabrics")),
    );
    devices
}
