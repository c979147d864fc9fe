//! Bookstore CLI - database migrations, seeding and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations (schema + session store)
//! bs-cli migrate
//!
//! # Load the sample catalogue and the two default accounts
//! bs-cli seed
//!
//! # Wipe everything and seed again
//! bs-cli seed --reset
//!
//! # Create an admin account
//! bs-cli admin create -u alice -e alice@example.com -p 'long-password'
//!
//! # Write placeholder cover images for the sample catalogue
//! bs-cli covers --out crates/storefront/static/covers
//! ```
//!
//! # Environment Variables
//!
//! - `BOOKSTORE_DATABASE_URL` - `PostgreSQL` connection string

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod catalogue;
mod commands;

#[derive(Parser)]
#[command(name = "bs-cli")]
#[command(author, version, about = "Bookstore CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the database with sample accounts and books
    Seed {
        /// Delete all users, books, carts and orders first
        #[arg(long)]
        reset: bool,
    },
    /// Manage admin accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Generate placeholder cover images for the sample catalogue
    Covers {
        /// Output directory
        #[arg(short, long, default_value = "crates/storefront/static/covers")]
        out: PathBuf,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin account
    Create {
        /// Login name
        #[arg(short, long)]
        username: String,

        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password (at least 8 characters)
        #[arg(short, long)]
        password: String,
    },
}

#[tokio::main]
async fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "bs_cli=info,bookstore_storefront=info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { reset } => commands::seed::run(reset).await?,
        Commands::Admin { action } => match action {
            AdminAction::Create {
                username,
                email,
                password,
            } => {
                commands::admin::create_user(&username, &email, &password).await?;
            }
        },
        Commands::Covers { out } => commands::covers::run(&out).await?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_seed_reset() {
        let cli = Cli::try_parse_from(["bs-cli", "seed", "--reset"]);
        assert!(matches!(cli.map(|c| c.command), Ok(Commands::Seed { reset: true })));
    }

    #[test]
    fn test_covers_default_out_dir() {
        let cli = Cli::try_parse_from(["bs-cli", "covers"]);
        match cli.map(|c| c.command) {
            Ok(Commands::Covers { out }) => {
                assert_eq!(out, PathBuf::from("crates/storefront/static/covers"));
            }
            _ => panic!("expected covers command"),
        }
    }
}
