//! Docker container states, grouped by compose project.

use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

use super::{find_tool, run_command};
use crate::core::health::ContainerState;
use crate::error::{AgentError, Result};

const COMPOSE_PROJECT_LABEL: &str = "com.docker.compose.project";

/// One line of `docker ps --format {{json .}}`
#[derive(Debug, Clone, Deserialize)]
struct DockerPsEntry {
    #[serde(rename = "Names")]
    names: String,
    #[serde(rename = "State", default)]
    state: String,
    #[serde(rename = "Labels", default)]
    labels: String,
}

/// Lists containers through the docker CLI
#[derive(Debug)]
pub struct DockerCollector {
    _private: (),
}

impl DockerCollector {
    /// `None` when the docker CLI is not installed
    pub fn new() -> Option<Self> {
        if find_tool("docker").is_none() {
            log::error!("docker command is not available. Docker reading disabled!");
            return None;
        }
        log::info!("Enabled Docker reader");
        Some(Self { _private: () })
    }

    /// Containers of every compose project, including stopped ones.
    ///
    /// A failing `docker ps` is an error, never an empty project list.
    pub fn list_projects(&self) -> Result<BTreeMap<String, Vec<ContainerState>>> {
        let args = ["ps", "--all", "--format", "{{json .}}"];
        let output = run_command("docker", &args, &[])?;

        if !output.success() {
            return Err(describe_docker_failure(&args.join(" "), &output.stderr));
        }

        Ok(parse_docker_ps(&output.stdout))
    }
}

/// Classify a non-zero `docker` exit by its stderr
pub fn describe_docker_failure(command: &str, stderr: &str) -> AgentError {
    if stderr.to_lowercase().contains("permission denied") {
        AgentError::permission_denied(format!("docker {}", command))
    } else {
        AgentError::collector(format!("docker {} failed: {}", command, stderr.trim()))
    }
}

/// Group `docker ps` JSON lines by compose project.
///
/// Containers without a compose label are grouped by the part of their name
/// before the first `_`. Malformed lines are skipped.
pub fn parse_docker_ps(output: &str) -> BTreeMap<String, Vec<ContainerState>> {
    let mut projects: BTreeMap<String, Vec<ContainerState>> = BTreeMap::new();

    for line in output.lines().filter(|l| !l.trim().is_empty()) {
        let entry: DockerPsEntry = match serde_json::from_str(line) {
            Ok(entry) => entry,
            Err(_) => {
                log::warn!("Skipping malformed line: {}", line);
                continue;
            }
        };

        let labels = parse_docker_labels(&entry.labels);
        let project = labels
            .get(COMPOSE_PROJECT_LABEL)
            .cloned()
            .unwrap_or_else(|| {
                entry
                    .names
                    .split('_')
                    .next()
                    .unwrap_or_default()
                    .to_string()
            });

        projects
            .entry(project)
            .or_default()
            .push(ContainerState::new(entry.names, entry.state));
    }

    projects
}

/// Parse docker's comma separated `key=value` label string.
pub fn parse_docker_labels(label_str: &str) -> HashMap<String, String> {
    // Label values may contain ", " which would break the split below
    let label_str = label_str.replace(", ", " ");

    label_str
        .split(',')
        .filter(|pair| !pair.is_empty())
        .filter_map(|pair| match pair.split_once('=') {
            Some((key, value)) => Some((key.to_string(), value.to_string())),
            None => {
                log::warn!("Invalid Docker label: {}", pair);
                None
            }
        })
        .collect()
}
