//! Souq CLI - operator tools for the storefront.
//!
//! # Usage
//!
//! ```bash
//! # Create the session table
//! souq-cli migrate sessions
//!
//! # Check the marketplace backend answers with the configured key
//! souq-cli check backend
//! ```
//!
//! # Commands
//!
//! - `migrate sessions` - Create the `tower_sessions` schema and table
//! - `check backend` - Call the backend's lookup endpoints and report

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "souq-cli")]
#[command(author, version, about = "Souq storefront operator tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate {
        #[command(subcommand)]
        target: MigrateTarget,
    },
    /// Check external dependencies
    Check {
        #[command(subcommand)]
        target: CheckTarget,
    },
}

#[derive(Subcommand)]
enum MigrateTarget {
    /// Create the session store table
    Sessions,
}

#[derive(Subcommand)]
enum CheckTarget {
    /// Call the marketplace backend with the storefront's service key
    Backend,
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
        Commands::Migrate { target } => match target {
            MigrateTarget::Sessions => commands::migrate::sessions().await?,
        },
        Commands::Check { target } => match target {
            CheckTarget::Backend => commands::check::backend().await?,
        },
    }
    Ok(())
}
