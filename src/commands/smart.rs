use anyhow::Result;
use clap::ArgMatches;

use crate::core::collectors::SmartCollector;
use crate::core::health::find_missing_devices;
use crate::ui::format_smart_section;

/// Print S.M.A.R.T. data for every detected device
pub fn execute(_matches: &ArgMatches) -> Result<()> {
    let mut reader = SmartCollector::new();
    let section = reader.collect();
    let missing = find_missing_devices(section.devices.keys().map(String::as_str));

    format_smart_section(&section, missing.as_ref());
    println!();
    Ok(())
}
