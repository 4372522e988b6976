//! LiteShop CLI - Catalog seeding and cache maintenance tools.
//!
//! # Usage
//!
//! ```bash
//! # Write the demo catalog to data/catalog.json
//! liteshop seed
//!
//! # Write the demo catalog somewhere else
//! liteshop seed -o /tmp/catalog.json
//!
//! # List offline cache generations
//! liteshop cache status
//!
//! # Delete every offline cache generation
//! liteshop cache clear
//! ```
//!
//! # Commands
//!
//! - `seed` - Write the demo product catalog
//! - `cache status` - List offline cache generations
//! - `cache clear` - Delete offline cache generations

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "liteshop")]
#[command(author, version, about = "LiteShop CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the demo product catalog as JSON
    Seed {
        /// Output path for the catalog file
        #[arg(short, long, default_value = "data/catalog.json")]
        output: PathBuf,
    },
    /// Inspect or clear the offline gateway cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// List cache generations with entry counts and disk usage
    Status,
    /// Delete all cache generations
    Clear,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Seed { output } => commands::seed::catalog(&output).await?,
        Commands::Cache { action } => match action {
            CacheAction::Status => commands::cache::status().await?,
            CacheAction::Clear => commands::cache::clear().await?,
        },
    }
    Ok(())
}
