use anyhow::Result;
use colored::Colorize;
use std::path::Path;

pub fn execute(config: &Path, links: &[String], compact: bool) -> Result<()> {
    let store = super::navigate_all(config, links)?;
    let state = store.state();

    let json = if compact {
        serde_json::to_string(state)?
    } else {
        serde_json::to_string_pretty(state)?
    };
    println!("{}", json);

    if let Some(leftover) = &state.leftover {
        eprintln!("{} {}", "Unmatched:".yellow().bold(), leftover);
    }

    if let Some(last) = links.last() {
        for rejected in store.parse(last)?.rejected {
            eprintln!("{} {}", "Rejected:".yellow(), rejected);
        }
    }

    eprintln!("{} {}", "Canonical path:".green().bold(), store.canonical_path()?);
    Ok(())
}
