// Beacon Agent Library - Public API

// Re-export error types
pub mod error;
pub use error::{AgentError, Result};

// Module declarations
pub mod commands;
pub mod core;
pub mod ui;

use std::io::Write;

// Re-export commonly used types
pub use crate::core::config::AgentConfig;

/// Width of the module column in log lines
const LOG_TARGET_WIDTH: usize = 15;

/// Initialize logging.
///
/// Lines look like `2024-05-01 12:00:00.123 beacon_agent::co INFO: message`.
/// `RUST_LOG` still overrides the level.
pub fn init_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} {} {}: {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                format_target(record.target()),
                record.level(),
                record.args()
            )
        })
        .init();
}

/// Pad or truncate a log target to a fixed column
fn format_target(target: &str) -> String {
    let short: String = target.chars().take(LOG_TARGET_WIDTH).collect();
    format!("{:<width$}", short, width = LOG_TARGET_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_target() {
        assert_eq!(format_target("agent"), "agent          ");
        assert_eq!(format_target("beacon_agent::core::agent"), "beacon_agent::c");
        assert_eq!(format_target("beacon_agent::core::agent").len(), LOG_TARGET_WIDTH);
    }
}
