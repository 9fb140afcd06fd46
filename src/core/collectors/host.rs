use std::fs;
use std::net::IpAddr;
use sysinfo::{Networks, System};

use crate::core::health::HostInfo;

const UNKNOWN: &str = "Unknown";

/// Static host identification, read once at startup
pub fn read_host_info() -> HostInfo {
    let (os, version) = match (System::name(), System::os_version()) {
        (Some(name), version) => (name, version.unwrap_or_else(|| UNKNOWN.to_string())),
        (None, _) => read_synology_version()
            .map(|v| ("Synology DSM".to_string(), v))
            .unwrap_or_else(|| (UNKNOWN.to_string(), UNKNOWN.to_string())),
    };

    let mut info = HostInfo {
        hostname: System::host_name().unwrap_or_else(|| UNKNOWN.to_string()),
        os,
        version,
        kernel: System::kernel_version().unwrap_or_else(|| UNKNOWN.to_string()),
        ..Default::default()
    };

    let networks = Networks::new_with_refreshed_list();
    for (interface, data) in networks.iter() {
        if !is_reportable_interface(interface) {
            continue;
        }
        for network in data.ip_networks() {
            if !is_reportable_address(&network.addr) {
                continue;
            }
            match network.addr {
                IpAddr::V4(addr) => info.ipv4_addresses.push(addr.to_string()),
                IpAddr::V6(addr) => info.ipv6_addresses.push(addr.to_string()),
            }
        }
    }
    info.ipv4_addresses.sort();
    info.ipv6_addresses.sort();

    info
}

fn read_synology_version() -> Option<String> {
    let content = fs::read_to_string("/etc/VERSION").ok()?;
    parse_synology_version(&content)
}

/// Extract `productversion` from a Synology `/etc/VERSION` file
pub fn parse_synology_version(content: &str) -> Option<String> {
    content
        .lines()
        .filter(|line| line.to_lowercase().contains("productversion"))
        .find_map(|line| line.split_once('='))
        .map(|(_, value)| value.trim().trim_matches('"').to_string())
}

/// Container bridges are not host addresses
pub fn is_reportable_interface(name: &str) -> bool {
    let name = name.to_lowercase();
    !name.contains("docker") && !name.starts_with("br-") && !name.starts_with("veth")
}

/// Skips loopback and IPv6 link-local addresses
pub fn is_reportable_address(addr: &IpAddr) -> bool {
    match addr {
        IpAddr::V4(v4) => !v4.is_loopback(),
        IpAddr::V6(v6) => !v6.is_loopback() && (v6.segments()[0] & 0xffc0) != 0xfe80,
    }
}
