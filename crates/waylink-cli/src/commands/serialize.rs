use anyhow::Result;
use std::path::Path;

pub fn execute(config: &Path, links: &[String]) -> Result<()> {
    let store = super::navigate_all(config, links)?;
    println!("{}", store.canonical_path()?);
    Ok(())
}
