mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "waylink")]
#[command(version, about = "Waylink CLI - resolve deep links into navigation state", long_about = None)]
struct Cli {
    /// Linking configuration file
    #[arg(short, long, global = true, default_value = "waylink.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply links in order and print the resulting state
    Resolve {
        /// Links or paths, applied one after another
        #[arg(required = true)]
        links: Vec<String>,

        /// Print the state as compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Apply links in order and print only the canonical path
    Serialize {
        /// Links or paths, applied one after another
        #[arg(required = true)]
        links: Vec<String>,
    },

    /// List the route table and shadowed patterns
    Routes,
}

fn main() -> Result<()> {
    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Execute command
    match cli.command {
        Commands::Resolve { links, compact } => {
            commands::resolve::execute(&cli.config, &links, compact)?;
        }
        Commands::Serialize { links } => {
            commands::serialize::execute(&cli.config, &links)?;
        }
        Commands::Routes => {
            commands::routes::execute(&cli.config)?;
        }
    }

    Ok(())
}
