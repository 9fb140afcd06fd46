//! Health evaluation.
//!
//! Turns one [`MetricsSnapshot`] into a single [`Verdict`]. Every check runs
//! on every call so that each breach gets logged, even when an earlier check
//! already decided the outcome.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;

use super::format_percent;
use super::snapshot::{FilesystemUsage, HealthStatus, MetricsSnapshot};

/// Threshold settings, fixed for the lifetime of the agent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Breach when a percentage metric is strictly above this value (0-100)
    pub percent_threshold: f64,
    /// Longest allowed silence towards the monitoring endpoint
    pub resend_interval: Duration,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            percent_threshold: 90.0,
            resend_interval: Duration::from_secs(10 * 60),
        }
    }
}

/// The individual checks, in evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Check {
    Cpu,
    Memory,
    Disk,
    Smart,
    MissingDisks,
    Containers,
    Virtualization,
    SecurityUpdates,
}

/// Outcome of one evaluation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub ok: bool,
    pub reasons: Vec<String>,
    /// Collector-level failures, distinct from threshold breaches
    pub hard_error: Option<String>,
    pub failed_checks: BTreeSet<Check>,
}

impl Verdict {
    pub fn healthy() -> Self {
        Self {
            ok: true,
            ..Default::default()
        }
    }

    pub fn failed(&self, check: Check) -> bool {
        self.failed_checks.contains(&check)
    }

    fn breach(&mut self, check: Check, reason: String) {
        log::warn!("{}", reason);
        self.failed_checks.insert(check);
        self.reasons.push(reason);
    }

    fn hard_failure(&mut self, source: &str, error: &str) {
        log::error!("{} collector failed: {}", source, error);
        let message = format!("{}: {}", source, error);
        self.hard_error = Some(match self.hard_error.take() {
            Some(previous) => format!("{}; {}", previous, message),
            None => message,
        });
    }
}

/// Evaluate a snapshot against the configured threshold.
///
/// Calling this twice on the same snapshot yields the same verdict.
pub fn evaluate(snapshot: &MetricsSnapshot, config: &ThresholdConfig) -> Verdict {
    let threshold = config.percent_threshold;
    let mut verdict = Verdict::default();

    if snapshot.cpu_load_percent > threshold {
        verdict.breach(
            Check::Cpu,
            format!(
                "CPU threshold reached at {}%",
                format_percent(snapshot.cpu_load_percent)
            ),
        );
    }

    if snapshot.memory_percent > threshold {
        verdict.breach(
            Check::Memory,
            format!(
                "Memory threshold reached at {}%",
                format_percent(snapshot.memory_percent)
            ),
        );
    }

    if let Some(fullest) = most_filled_filesystem(&snapshot.disk_usage) {
        log::debug!(
            "Most filled file system is mounted on {} at {}% used",
            fullest.mount_point,
            format_percent(fullest.used_percent)
        );
        if fullest.used_percent > threshold {
            verdict.breach(
                Check::Disk,
                format!(
                    "Disk threshold reached at {} at {}% used",
                    fullest.mount_point,
                    format_percent(fullest.used_percent)
                ),
            );
        }
    }

    if let Some(ref smart) = snapshot.smart {
        for (device, record) in &smart.devices {
            if let Some(ref error) = record.error {
                log::warn!("S.M.A.R.T. data unavailable for {}: {}", device, error);
            }
            if record.health_status == HealthStatus::Nok {
                verdict.breach(
                    Check::Smart,
                    format!("S.M.A.R.T. status of {} is NOK", device),
                );
            }
        }
        if let Some(ref error) = smart.error {
            verdict.hard_failure("S.M.A.R.T.", error);
        }
    }

    if let Some(ref missing) = snapshot.missing_disks {
        for (family, indices) in missing.families() {
            verdict.breach(
                Check::MissingDisks,
                format!("Missing {} disks: {}", family, indices),
            );
        }
    }

    if let Some(ref projects) = snapshot.docker_projects {
        for (project, containers) in projects {
            for container in containers.iter().filter(|c| !c.is_running()) {
                verdict.breach(
                    Check::Containers,
                    format!(
                        "Container {} in project {} is {}",
                        container.name, project, container.state
                    ),
                );
            }
        }
    }
    if let Some(ref error) = snapshot.docker_error {
        verdict.hard_failure("Docker", error);
    }

    if let Some(ref proxmox) = snapshot.proxmox {
        for vm in proxmox.vms.iter().filter(|g| !g.is_running()) {
            verdict.breach(
                Check::Virtualization,
                format!("VM {} is {}", vm.name, vm.status),
            );
        }
        for lxc in proxmox.containers.iter().filter(|g| !g.is_running()) {
            verdict.breach(
                Check::Virtualization,
                format!("LXC {} is {}", lxc.name, lxc.status),
            );
        }
        if let Some(ref error) = proxmox.error {
            verdict.hard_failure("Proxmox", error);
        }
    }

    if snapshot.security_upgrade_count > 0 {
        verdict.breach(
            Check::SecurityUpdates,
            format!(
                "{} security updates available",
                snapshot.security_upgrade_count
            ),
        );
    }

    verdict.ok = verdict.reasons.is_empty() && verdict.hard_error.is_none();
    verdict
}

/// The fullest filesystem; the first one wins on ties.
pub fn most_filled_filesystem(disks: &[FilesystemUsage]) -> Option<&FilesystemUsage> {
    disks.iter().fold(None, |best: Option<&FilesystemUsage>, fs| match best {
        Some(current) if current.used_percent >= fs.used_percent => Some(current),
        _ => Some(fs),
    })
}
