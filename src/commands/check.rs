use anyhow::{Context, Result};
use clap::ArgMatches;
use serde_json::json;

use crate::core::Agent;
use crate::ui::format_health_report;

/// Run a single collect and evaluate pass and print the result.
///
/// Nothing is delivered and the notification state is not touched.
pub fn execute(matches: &ArgMatches) -> Result<()> {
    let config = super::load_config(matches)?;
    let mut agent = Agent::from_config(&config).context("Failed to initialize collectors")?;

    let (snapshot, verdict, latency) = agent.inspect();

    if matches.get_flag("json") {
        let output = json!({
            "ok": verdict.ok,
            "verdict": verdict,
            "latency_seconds": latency.as_secs_f64(),
            "metrics": snapshot,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        format_health_report(&snapshot, &verdict, config.agent.notify_threshold_percent);
    }

    Ok(())
}
