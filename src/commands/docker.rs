use anyhow::{bail, Context, Result};
use clap::ArgMatches;

use crate::core::collectors::DockerCollector;
use crate::ui::format_docker_projects;

/// Print containers grouped by compose project
pub fn execute(_matches: &ArgMatches) -> Result<()> {
    let Some(reader) = DockerCollector::new() else {
        bail!("docker command is not available");
    };

    let projects = reader.list_projects().context("Failed to list containers")?;
    format_docker_projects(&projects);
    println!();
    Ok(())
}
