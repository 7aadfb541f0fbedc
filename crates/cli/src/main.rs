//! Shopfront CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Apply database migrations
//! shopfront-cli migrate
//!
//! # Create an admin account (password from SHOPFRONT_ADMIN_PASSWORD)
//! SHOPFRONT_ADMIN_PASSWORD=... shopfront-cli admin create --username alice
//!
//! # Reset an account's password
//! SHOPFRONT_ADMIN_PASSWORD=... shopfront-cli admin set-password --username alice
//!
//! # Load products from a YAML file
//! shopfront-cli seed products --file crates/cli/seed/products.yaml
//! ```
//!
//! All commands read the database location from `SHOPFRONT_DATABASE_URL`
//! (or `DATABASE_URL`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "shopfront-cli")]
#[command(author, version, about = "Shopfront CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply database migrations
    Migrate,
    /// Manage admin accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Seed the database
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create an admin account
    Create {
        /// Login name for the new admin
        #[arg(short, long)]
        username: String,
    },
    /// Set the password of an existing account
    SetPassword {
        /// Account to update
        #[arg(short, long)]
        username: String,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Insert products from a YAML file, skipping names that already exist
    Products {
        /// Path to the YAML file
        #[arg(short, long)]
        file: String,
    },
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
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Admin { action } => match action {
            AdminAction::Create { username } => commands::admin::create(&username).await?,
            AdminAction::SetPassword { username } => {
                commands::admin::set_password(&username).await?;
            }
        },
        Commands::Seed { target } => match target {
            SeedTarget::Products { file } => {
                commands::seed::products(&file).await?;
            }
        },
    }
    Ok(())
}
