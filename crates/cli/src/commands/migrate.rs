//! Database migration command.
//!
//! Runs the storefront schema migrations from `crates/storefront/migrations/`
//! and then creates the `tower_sessions` session table.

use tower_sessions_sqlx_store::PostgresStore;

use bookstore_storefront::MIGRATOR;

use super::{CommandError, connect};

/// Run all migrations.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    tracing::info!("Running bookstore migrations...");
    MIGRATOR.run(&pool).await?;

    tracing::info!("Running session store migrations...");
    PostgresStore::new(pool).migrate().await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
