use once_cell::sync::Lazy;
use regex::Regex;

use super::{find_tool, run_command};

static APT_INSTALL_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*Inst\s+").expect("valid apt pattern"));

/// Pending upgrades as `(security, other)`.
///
/// Uses apt on Debian-like systems and synopkg on Synology DSM. Hosts with
/// neither report `(0, 0)`.
pub fn count_upgradable_packages() -> (u32, u32) {
    if find_tool("apt-get").is_some() {
        return count_with("apt-get", &["--just-print", "dist-upgrade"], parse_apt_output);
    }
    if find_tool("synopkg").is_some() {
        return count_with("synopkg", &["checkupdateall"], parse_synopkg_output);
    }
    log::debug!("No supported package manager found, skipping upgrade count");
    (0, 0)
}

fn count_with(program: &str, args: &[&str], parse: fn(&str) -> Option<(u32, u32)>) -> (u32, u32) {
    let output = match run_command(program, args, &[("LC_ALL", "C")]) {
        Ok(output) => output,
        Err(e) => {
            log::error!("An error occurred: {}", e);
            return (0, 0);
        }
    };

    if !output.success() {
        log::error!("{} {} failed: {}", program, args.join(" "), output.diagnostic());
        return (0, 0);
    }

    parse(&output.stdout).unwrap_or_else(|| {
        log::error!("Could not parse output of {} {}", program, args.join(" "));
        (0, 0)
    })
}

/// Count `Inst` lines of a simulated `apt-get dist-upgrade`
pub fn parse_apt_output(output: &str) -> Option<(u32, u32)> {
    let (mut security, mut other) = (0, 0);
    for line in output.lines().filter(|l| APT_INSTALL_LINE.is_match(l)) {
        if line.contains("security") {
            security += 1;
        } else {
            other += 1;
        }
    }
    Some((security, other))
}

/// Synology lists pending updates as a JSON array; all of them count as security
pub fn parse_synopkg_output(output: &str) -> Option<(u32, u32)> {
    let trimmed = output.trim();
    if trimmed.is_empty() {
        return Some((0, 0));
    }
    let updates: Vec<serde_json::Value> = serde_json::from_str(trimmed).ok()?;
    Some((updates.len() as u32, 0))
}
