use anyhow::Result;

pub fn execute() -> Result<()> {
    println!("beacon-agent version {}", env!("CARGO_PKG_VERSION"));
    Ok(())
}
