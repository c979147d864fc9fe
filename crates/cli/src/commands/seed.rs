//! Seed the database with the default accounts and the sample catalogue.
//!
//! - `admin` / `admin123` (admin)
//! - `john_doe` / `password123` (shopper)
//! - 100 books across 10 genres from `data/catalogue.yaml`
//!
//! Existing accounts are left alone and books are only loaded into an empty
//! catalogue, so running the command twice is harmless. `--reset` empties
//! every table first.

use sqlx::PgPool;

use bookstore_core::{Email, Username};
use bookstore_storefront::db::{BookRepository, UserRepository};
use bookstore_storefront::services::{AuthError, AuthService, auth::hash_password};

use super::{CommandError, connect};
use crate::catalogue;

const ADMIN: (&str, &str, &str) = ("admin", "admin@bookstore.com", "admin123");
const SHOPPER: (&str, &str, &str) = ("john_doe", "john@example.com", "password123");

/// Seed the database.
pub async fn run(reset: bool) -> Result<(), CommandError> {
    let books = catalogue::load()?;
    let pool = connect().await?;

    if reset {
        tracing::warn!("Deleting all users, books, carts and orders");
        sqlx::query(
            "TRUNCATE bookstore.order_items, bookstore.orders, bookstore.cart_items,
                      bookstore.books, bookstore.users
             RESTART IDENTITY CASCADE",
        )
        .execute(&pool)
        .await?;
    }

    seed_admin(&pool).await?;
    seed_shopper(&pool).await?;

    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bookstore.books")
        .fetch_one(&pool)
        .await?;
    if existing == 0 {
        let repo = BookRepository::new(&pool);
        for book in &books {
            repo.create(&book.to_input()?).await?;
        }
        tracing::info!(count = books.len(), "Sample catalogue loaded");
    } else {
        tracing::info!(existing, "Catalogue not empty, skipping books");
    }

    summary(&pool).await
}

/// The seeded admin password is shorter than the registration minimum, so it
/// is hashed and inserted directly instead of going through `AuthService`.
async fn seed_admin(pool: &PgPool) -> Result<(), CommandError> {
    let (username, email, password) = ADMIN;
    let users = UserRepository::new(pool);

    if users.get_with_password_hash(username).await?.is_some() {
        tracing::info!(username, "Account exists, skipping");
        return Ok(());
    }

    let username = Username::parse(username).map_err(AuthError::from)?;
    let email = Email::parse(email).map_err(AuthError::from)?;
    let user = users
        .create(&username, &email, &hash_password(password)?, true)
        .await?;
    tracing::info!(user_id = %user.id, "Admin account created (admin / admin123)");
    Ok(())
}

async fn seed_shopper(pool: &PgPool) -> Result<(), CommandError> {
    let (username, email, password) = SHOPPER;

    if UserRepository::new(pool)
        .get_with_password_hash(username)
        .await?
        .is_some()
    {
        tracing::info!(username, "Account exists, skipping");
        return Ok(());
    }

    let user = AuthService::new(pool)
        .create_account(username, email, password, false)
        .await?;
    tracing::info!(user_id = %user.id, "Shopper account created (john_doe / password123)");
    Ok(())
}

async fn summary(pool: &PgPool) -> Result<(), CommandError> {
    let users: Vec<(String, bool)> =
        sqlx::query_as("SELECT username, is_admin FROM bookstore.users ORDER BY id")
            .fetch_all(pool)
            .await?;
    let genres: Vec<(String, i64)> = sqlx::query_as(
        "SELECT genre, COUNT(*) FROM bookstore.books GROUP BY genre ORDER BY genre",
    )
    .fetch_all(pool)
    .await?;

    tracing::info!("Seeding complete!");
    tracing::info!("  Users: {}", users.len());
    for (username, is_admin) in &users {
        tracing::info!("    - {username}{}", if *is_admin { " (admin)" } else { "" });
    }
    tracing::info!("  Books: {}", genres.iter().map(|(_, n)| n).sum::<i64>());
    for (genre, count) in &genres {
        tracing::info!("    - {genre}: {count}");
    }
    Ok(())
}
