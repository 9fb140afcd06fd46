use crate::core::dispatch::summarize;
use crate::core::health::{
    format_percent, ContainerState, HealthStatus, MetricsSnapshot, MissingDevices, SmartSection,
    Verdict,
};
use crate::ui::formatters::format_timestamp;
use colored::*;
use std::collections::BTreeMap;

/// Print a full health report for one cycle
pub fn format_health_report(snapshot: &MetricsSnapshot, verdict: &Verdict, threshold: f64) {
    println!("\n{}", "HOST HEALTH".bold().bright_cyan());
    println!("{}", "=".repeat(80));
    println!("Collected at {}", format_timestamp(snapshot.timestamp).dimmed());

    if let Some(ref host) = snapshot.host {
        print_section_header("Host");
        println!("  Hostname: {}", host.hostname);
        println!("  OS: {} {}", host.os, host.version);
        println!("  Kernel: {}", host.kernel);
        if !host.ipv4_addresses.is_empty() {
            println!("  IPv4: {}", host.ipv4_addresses.join(", "));
        }
        if !host.ipv6_addresses.is_empty() {
            println!("  IPv6: {}", host.ipv6_addresses.join(", "));
        }
    }

    print_section_header("Resources");
    println!(
        "  CPU: {} ({} cores)",
        colorize_percent(snapshot.cpu_load_percent, threshold),
        snapshot.num_cpu_cores
    );
    if let Some(load) = snapshot.load_average {
        println!(
            "  Load Average: {:.2} {:.2} {:.2}",
            load.one, load.five, load.fifteen
        );
    }
    println!(
        "  Memory: {}",
        colorize_percent(snapshot.memory_percent, threshold)
    );

    if !snapshot.disk_usage.is_empty() {
        print_section_header("Filesystems");
        for fs in &snapshot.disk_usage {
            println!(
                "  {:<30} {}",
                fs.mount_point,
                colorize_percent(fs.used_percent, threshold)
            );
        }
    }

    if let Some(ref smart) = snapshot.smart {
        format_smart_section(smart, snapshot.missing_disks.as_ref());
    }

    if let Some(ref projects) = snapshot.docker_projects {
        format_docker_projects(projects);
    } else if let Some(ref error) = snapshot.docker_error {
        print_section_header("Docker");
        println!("  {}", error.red());
    }

    if let Some(ref proxmox) = snapshot.proxmox {
        print_section_header("Proxmox");
        if let Some(ref node) = proxmox.node {
            println!("  Node: {}", node);
        }
        if let Some(ref error) = proxmox.error {
            println!("  {}", error.red());
        }
        for vm in &proxmox.vms {
            println!("  VM  {:<26} {}", vm.name, colorize_state(&vm.status, vm.is_running()));
        }
        for ct in &proxmox.containers {
            println!("  LXC {:<26} {}", ct.name, colorize_state(&ct.status, ct.is_running()));
        }
    }

    print_section_header("Updates");
    println!(
        "  Pending: {} ({} security)",
        snapshot.package_upgrade_count, snapshot.security_upgrade_count
    );

    format_verdict(snapshot, verdict);
    println!();
}

/// Print the verdict and the message a push monitor would receive
pub fn format_verdict(snapshot: &MetricsSnapshot, verdict: &Verdict) {
    print_section_header("Verdict");

    if verdict.ok {
        println!("  Status: {}", "UP".green().bold());
    } else {
        println!("  Status: {}", "DOWN".red().bold());
    }

    for reason in &verdict.reasons {
        println!("  {} {}", "•".yellow(), reason);
    }
    if let Some(ref error) = verdict.hard_error {
        println!("  {} {}", "✗".red(), error.red());
    }

    println!("  Summary: {}", summarize(snapshot, verdict).dimmed());
}

/// Print S.M.A.R.T. status per device plus any gaps in device numbering
pub fn format_smart_section(smart: &SmartSection, missing: Option<&MissingDevices>) {
    print_section_header("S.M.A.R.T.");

    if let Some(ref error) = smart.error {
        println!("  {}", error.red());
    }

    if smart.devices.is_empty() && smart.error.is_none() {
        println!("  {}", "No devices found".dimmed());
    }

    for (device, record) in &smart.devices {
        let status = match record.health_status {
            HealthStatus::Ok => "OK".green(),
            HealthStatus::Nok => "NOK".red().bold(),
            HealthStatus::Unknown => "unknown".yellow(),
        };
        let kind = if record.is_nvme { "NVMe" } else { "ATA/SCSI" };
        println!("  {:<16} {:<9} {}", device, kind, status);

        if let Some(ref error) = record.error {
            println!("    {}", error.dimmed());
        } else if !record.attributes.is_empty() {
            println!("    {} attributes read", record.attributes.len());
        }
    }

    if let Some(missing) = missing {
        for (family, indices) in missing.families() {
            println!("  {} {} {}", "Missing".red().bold(), family, indices);
        }
    }
}

/// Print containers grouped by compose project
pub fn format_docker_projects(projects: &BTreeMap<String, Vec<ContainerState>>) {
    print_section_header("Docker");

    if projects.is_empty() {
        println!("  {}", "No containers found".dimmed());
        return;
    }

    for (project, containers) in projects {
        println!("  {}", project.bold());
        for container in containers {
            println!(
                "    {:<34} {}",
                container.name,
                colorize_state(&container.state, container.is_running())
            );
        }
    }
}

fn print_section_header(title: &str) {
    println!("\n{}", title.bold().green());
    println!("{}", "-".repeat(title.chars().count()));
}

fn colorize_percent(value: f64, threshold: f64) -> ColoredString {
    let text = format!("{}%", format_percent(value));
    if value > threshold {
        text.red().bold()
    } else if value > threshold * 0.8 {
        text.yellow()
    } else {
        text.green()
    }
}

fn colorize_state(state: &str, running: bool) -> ColoredString {
    if running {
        state.green()
    } else {
        state.red()
    }
}
