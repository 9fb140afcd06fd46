//! Human-readable one-line summary of a verdict.
//!
//! Each enabled check contributes one phrase: an "all clear" phrase when it
//! passed, or the specific failures otherwise.

use crate::core::health::{
    format_percent, most_filled_filesystem, Check, HealthStatus, MetricsSnapshot, Verdict,
};

const SECTION_SEPARATOR: &str = "; ";

/// Build the summary line for a snapshot and its verdict.
pub fn summarize(snapshot: &MetricsSnapshot, verdict: &Verdict) -> String {
    let mut parts = vec![cpu_phrase(snapshot, verdict), memory_phrase(snapshot, verdict)];

    if let Some(phrase) = disk_phrase(snapshot, verdict) {
        parts.push(phrase);
    }
    if let Some(phrase) = smart_phrase(snapshot) {
        parts.push(phrase);
    }
    if let Some(phrase) = containers_phrase(snapshot) {
        parts.push(phrase);
    }
    if let Some(phrase) = vms_phrase(snapshot) {
        parts.push(phrase);
    }
    parts.push(security_phrase(snapshot));

    parts.join(SECTION_SEPARATOR)
}

fn cpu_phrase(snapshot: &MetricsSnapshot, verdict: &Verdict) -> String {
    if verdict.failed(Check::Cpu) {
        format!("CPU at {}%", format_percent(snapshot.cpu_load_percent))
    } else {
        "CPU OK".to_string()
    }
}

fn memory_phrase(snapshot: &MetricsSnapshot, verdict: &Verdict) -> String {
    if verdict.failed(Check::Memory) {
        format!("Memory at {}%", format_percent(snapshot.memory_percent))
    } else {
        "Memory OK".to_string()
    }
}

fn disk_phrase(snapshot: &MetricsSnapshot, verdict: &Verdict) -> Option<String> {
    let fullest = most_filled_filesystem(&snapshot.disk_usage)?;
    if verdict.failed(Check::Disk) {
        Some(format!(
            "Disk {} at {}% used",
            fullest.mount_point,
            format_percent(fullest.used_percent)
        ))
    } else {
        Some("Disks OK".to_string())
    }
}

fn smart_phrase(snapshot: &MetricsSnapshot) -> Option<String> {
    if snapshot.smart.is_none() && snapshot.missing_disks.is_none() {
        return None;
    }

    let mut problems = Vec::new();

    if let Some(ref smart) = snapshot.smart {
        if let Some(ref error) = smart.error {
            problems.push(format!("S.M.A.R.T. error: {}", error));
        }
        let failing: Vec<&str> = smart
            .devices
            .iter()
            .filter(|(_, record)| record.health_status == HealthStatus::Nok)
            .map(|(device, _)| device.as_str())
            .collect();
        if !failing.is_empty() {
            problems.push(format!("S.M.A.R.T. NOK: {}", failing.join(", ")));
        }
    }

    if let Some(ref missing) = snapshot.missing_disks {
        let families: Vec<String> = missing
            .families()
            .into_iter()
            .map(|(family, indices)| format!("{} {}", family, indices))
            .collect();
        if !families.is_empty() {
            problems.push(format!("Missing disks: {}", families.join(", ")));
        }
    }

    if problems.is_empty() {
        Some("S.M.A.R.T. OK".to_string())
    } else {
        Some(problems.join(SECTION_SEPARATOR))
    }
}

fn containers_phrase(snapshot: &MetricsSnapshot) -> Option<String> {
    if let Some(ref error) = snapshot.docker_error {
        return Some(format!("Docker error: {}", error));
    }
    let projects = snapshot.docker_projects.as_ref()?;

    let failing: Vec<String> = projects
        .iter()
        .flat_map(|(project, containers)| {
            containers
                .iter()
                .filter(|c| !c.is_running())
                .map(move |c| format!("{}/{} ({})", project, c.name, c.state))
        })
        .collect();

    if failing.is_empty() {
        Some("Containers OK".to_string())
    } else {
        Some(format!("Containers down: {}", failing.join(", ")))
    }
}

fn vms_phrase(snapshot: &MetricsSnapshot) -> Option<String> {
    let proxmox = snapshot.proxmox.as_ref()?;

    if let Some(ref error) = proxmox.error {
        return Some(format!("Proxmox error: {}", error));
    }

    let failing: Vec<String> = proxmox
        .vms
        .iter()
        .map(|g| ("VM", g))
        .chain(proxmox.containers.iter().map(|g| ("LXC", g)))
        .filter(|(_, guest)| !guest.is_running())
        .map(|(kind, guest)| format!("{} {} ({})", kind, guest.name, guest.status))
        .collect();

    if failing.is_empty() {
        Some("VMs OK".to_string())
    } else {
        Some(format!("VMs down: {}", failing.join(", ")))
    }
}

fn security_phrase(snapshot: &MetricsSnapshot) -> String {
    match snapshot.security_upgrade_count {
        0 => "No security updates".to_string(),
        n => format!("{} security updates", n),
    }
}
