//! Signal collectors.
//!
//! Each collector produces one section of the [`MetricsSnapshot`]. Disabled
//! collectors leave their section `None`; failing collectors fill in the
//! section's `error` instead of aborting the cycle.

pub mod docker;
pub mod host;
pub mod packages;
pub mod proxmox;
pub mod smart;
pub mod system;

use std::path::PathBuf;
use std::process::Command;
use std::time::Instant;

use crate::core::config::AgentConfig;
use crate::core::health::{HostInfo, MetricsSnapshot};
use crate::error::{AgentError, Result};

pub use docker::DockerCollector;
pub use proxmox::ProxmoxCollector;
pub use smart::SmartCollector;
pub use system::SystemCollector;

/// Anything that can produce a snapshot once per cycle
pub trait SnapshotSource {
    fn collect(&mut self) -> MetricsSnapshot;
}

/// Output of an external tool
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// stderr if it has content, stdout otherwise
    pub fn diagnostic(&self) -> &str {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim()
        } else {
            stderr
        }
    }
}

/// Locate an external tool on the PATH
pub fn find_tool(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}

/// Run an external tool and capture its output.
///
/// A non-zero exit status is not an error here; callers interpret it.
pub fn run_command(program: &str, args: &[&str], envs: &[(&str, &str)]) -> Result<CommandOutput> {
    let start = Instant::now();
    let output = Command::new(program)
        .args(args)
        .envs(envs.iter().copied())
        .output()
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::PermissionDenied => AgentError::permission_denied(format!(
                "{}: {}. You may need elevated privileges to run this command.",
                program, e
            )),
            _ => AgentError::collector(format!("Failed to execute {}: {}", program, e)),
        })?;

    let elapsed = start.elapsed();
    if elapsed.as_secs() >= 3 {
        log::debug!("{} {} took {:.3}s", program, args.join(" "), elapsed.as_secs_f64());
    }

    Ok(CommandOutput {
        code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// All collectors enabled by the configuration
pub struct SnapshotCollector {
    system: SystemCollector,
    host: HostInfo,
    smart: Option<SmartCollector>,
    docker: Option<DockerCollector>,
    proxmox: Option<ProxmoxCollector>,
}

impl SnapshotCollector {
    pub fn from_config(config: &AgentConfig) -> Result<Self> {
        let host = host::read_host_info();
        log::info!(
            "Running on {} ({} {}, kernel {})",
            host.hostname,
            host.os,
            host.version,
            host.kernel
        );

        let smart = if config.smartctl.enabled {
            log::info!("Enabled S.M.A.R.T. reader");
            Some(SmartCollector::new())
        } else {
            None
        };

        let docker = if config.docker.enabled {
            DockerCollector::new()
        } else {
            None
        };

        let proxmox = if config.proxmox.enabled {
            let (token_id, token_secret) = config.proxmox_token()?;
            ProxmoxCollector::new(&token_id, &token_secret)?
        } else {
            None
        };

        Ok(Self {
            system: SystemCollector::new(),
            host,
            smart,
            docker,
            proxmox,
        })
    }
}

impl SnapshotSource for SnapshotCollector {
    fn collect(&mut self) -> MetricsSnapshot {
        let start = Instant::now();
        let sample = self.system.collect();

        let (security_upgrade_count, other_upgrade_count) =
            packages::count_upgradable_packages();

        let smart = self.smart.as_mut().map(|reader| reader.collect());
        let (docker_projects, docker_error) = match self.docker.as_ref().map(|r| r.list_projects()) {
            None => (None, None),
            Some(Ok(projects)) => (Some(projects), None),
            Some(Err(e)) => {
                log::error!("Docker query failed: {}", e);
                (None, Some(e.to_string()))
            }
        };
        let proxmox = self.proxmox.as_ref().map(|reader| reader.collect());

        log::debug!("Metrics load took: {:.3}s", start.elapsed().as_secs_f64());

        MetricsSnapshot {
            timestamp: chrono::Utc::now().timestamp(),
            cpu_load_percent: sample.cpu_load_percent,
            num_cpu_cores: sample.num_cpu_cores,
            memory_percent: sample.memory_percent,
            disk_usage: sample.disk_usage,
            load_average: Some(sample.load_average),
            host: Some(self.host.clone()),
            smart,
            missing_disks: None,
            docker_projects,
            docker_error,
            proxmox,
            package_upgrade_count: security_upgrade_count + other_upgrade_count,
            security_upgrade_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_prefers_stderr() {
        let output = CommandOutput {
            code: Some(2),
            stdout: "partial output\n".to_string(),
            stderr: "  Permission denied\n".to_string(),
        };
        assert_eq!(output.diagnostic(), "Permission denied");
        assert!(!output.success());

        let quiet = CommandOutput {
            code: Some(1),
            stdout: "only stdout".to_string(),
            stderr: String::new(),
        };
        assert_eq!(quiet.diagnostic(), "only stdout");
    }

    #[test]
    fn test_missing_program_is_collector_error() {
        let result = run_command("beacon-agent-no-such-tool", &[], &[]);
        assert!(matches!(result, Err(AgentError::Collector(_))));
    }
}
