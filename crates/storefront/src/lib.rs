//! Bookstore storefront library.
//!
//! The shop, the back-office and everything they share: configuration,
//! repositories, services, middleware and route handlers. The `bookstore`
//! binary serves it; `bs-cli` reuses the repositories and migrations.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

/// Embedded schema migrations, run by `bs-cli migrate`.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
