use anyhow::Result;
use clap::{Arg, ArgAction, Command};

use beacon_agent::commands;
use beacon_agent::init_logging;

fn build_cli() -> Command {
    Command::new("beacon-agent")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Host health agent that reports to a push monitor")
        .disable_version_flag(true)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("PATH")
                .help("Path to the JSON configuration file")
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable debug logging")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("run")
                .about("Run the monitoring loop until interrupted"),
        )
        .subcommand(
            Command::new("check")
                .about("Collect and evaluate once, without sending anything")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print the snapshot and verdict as JSON")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("smart")
                .about("Show S.M.A.R.T. status and missing disks"),
        )
        .subcommand(
            Command::new("docker")
                .about("Show Docker containers grouped by compose project"),
        )
        .subcommand(
            Command::new("version")
                .about("Shows version information"),
        )
        .subcommand(
            Command::new("completions")
                .about("Generate shell completion scripts")
                .arg(
                    Arg::new("shell")
                        .help("Shell to generate completions for (bash, zsh, fish, powershell, elvish)")
                        .required(true)
                        .index(1),
                ),
        )
}

fn main() -> Result<()> {
    let mut cli = build_cli();
    let matches = cli.clone().get_matches();

    init_logging(matches.get_flag("verbose"));

    match matches.subcommand() {
        Some(("run", sub_matches)) => commands::run(sub_matches)?,
        Some(("check", sub_matches)) => commands::check(sub_matches)?,
        Some(("smart", sub_matches)) => commands::smart(sub_matches)?,
        Some(("docker", sub_matches)) => commands::docker(sub_matches)?,
        Some(("version", _)) => commands::version()?,
        Some(("completions", sub_matches)) => {
            commands::completions::execute(sub_matches, &mut cli)?
        }
        _ => {
            println!("Welcome to beacon-agent!");
            println!("Use 'beacon-agent --help' for more information.");
        }
    }

    Ok(())
}
