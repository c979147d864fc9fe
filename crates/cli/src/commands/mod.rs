//! Command implementations.

pub mod admin;
pub mod covers;
pub mod migrate;
pub mod seed;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

use bookstore_storefront::db::{self, RepositoryError};
use bookstore_storefront::services::AuthError;

use crate::catalogue::CatalogueError;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection or query error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration error.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Repository error.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Account creation error.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The bundled catalogue is unusable.
    #[error(transparent)]
    Catalogue(#[from] CatalogueError),

    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Template rendering error.
    #[error("Render error: {0}")]
    Render(#[from] askama::Error),
}

/// Connect to the database named by `BOOKSTORE_DATABASE_URL`.
pub async fn connect() -> Result<PgPool, CommandError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("BOOKSTORE_DATABASE_URL")
        .map(SecretString::from)
        .map_err(|_| CommandError::MissingEnvVar("BOOKSTORE_DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    Ok(db::create_pool(&database_url).await?)
}
