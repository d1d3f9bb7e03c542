use anyhow::Result;
use colored::Colorize;
use std::path::Path;
use waylink::{LinkingConfig, Presentation};

pub fn execute(config: &Path) -> Result<()> {
    let config = LinkingConfig::load(config)?;
    let table = config.build_table()?;

    if table.is_empty() {
        println!("{}", "No routes configured".yellow());
        return Ok(());
    }

    println!("{}", "Routes (declaration order):".green().bold());
    for pattern in table.patterns() {
        let presentation = match pattern.presentation {
            Presentation::Screen => "screen".normal(),
            Presentation::SidePane => "side pane".cyan(),
            Presentation::FullScreen => "full screen".magenta(),
        };

        let typed: Vec<String> = pattern
            .param_types
            .iter()
            .map(|(name, ty)| format!("{}: {}", name, ty))
            .collect();

        println!(
            "  {:<20} {:<32} {:<12} {}",
            pattern.name.bold(),
            pattern.template,
            presentation,
            typed.join(", ").dimmed()
        );
    }

    if !config.prefixes.is_empty() {
        println!();
        println!("Prefixes: {}", config.prefixes.join(", ").cyan());
    }
    if let Some(initial) = &config.initial_route {
        println!("Initial route: {}", initial.cyan());
    }

    let shadowed = table.shadowed();
    if !shadowed.is_empty() {
        println!();
        println!("{}", "Shadowed routes (never matched):".yellow().bold());
        for entry in shadowed {
            println!("  {} {} {}", entry.shadowed.bold(), "shadowed by".dimmed(), entry.by);
        }
    }

    Ok(())
}
