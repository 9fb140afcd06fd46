use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::ArgMatches;

use crate::core::Agent;
use crate::ui::{dimmed, format_duration, info, success};

/// Run the monitoring loop until Ctrl+C
pub fn execute(matches: &ArgMatches) -> Result<()> {
    let config = super::load_config(matches)?;
    let mut agent = Agent::from_config(&config).context("Failed to start agent")?;

    let running = Arc::new(AtomicBool::new(true));
    let running_clone = running.clone();

    // Setup Ctrl+C handler
    ctrlc::set_handler(move || {
        log::info!("Interrupt received, stopping after the current cycle");
        running_clone.store(false, Ordering::SeqCst);
    })
    .map_err(|e| anyhow::anyhow!("Failed to set Ctrl+C handler: {}", e))?;

    info(&format!(
        "Monitoring every {}, reporting via {}",
        format_duration(config.refresh_interval()),
        agent.backend_name()
    ));
    dimmed("Press Ctrl+C to stop");

    agent.run(&running)?;
    success("Agent stopped");
    Ok(())
}
