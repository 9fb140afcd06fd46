// Command handlers module
pub mod check;
pub mod completions;
pub mod docker;
pub mod run;
pub mod smart;
pub mod version;

use anyhow::{Context, Result};
use clap::ArgMatches;

use crate::core::AgentConfig;

// Re-exports for cleaner imports
pub use check::execute as check;
pub use docker::execute as docker;
pub use run::execute as run;
pub use smart::execute as smart;
pub use version::execute as version;

/// Load the configuration named by the global `--config` argument
pub fn load_config(matches: &ArgMatches) -> Result<AgentConfig> {
    let explicit = matches.get_one::<String>("config").map(String::as_str);
    let path = AgentConfig::resolve_path(explicit)?;

    AgentConfig::load(&path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))
}
