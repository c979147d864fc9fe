//! Integration tests for the bookstore.
//!
//! # Running Tests
//!
//! ```bash
//! # Database tests: each test gets a fresh database with migrations applied
//! DATABASE_URL=postgres://localhost/bookstore_test \
//!     cargo test -p bookstore-integration-tests -- --ignored
//!
//! # HTTP tests: against a running, seeded server
//! bs-cli migrate && bs-cli seed --reset && cargo run -p bookstore-storefront &
//! BOOKSTORE_BASE_URL=http://localhost:5000 \
//!     cargo test -p bookstore-integration-tests --test http_flow -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `checkout` - Order placement against a real database
//! - `admin_orders` - Order status changes and dashboard numbers
//! - `http_flow` - Login, cart and access control over HTTP

use sqlx::PgPool;

use bookstore_core::{Email, Price, UserId, Username};
use bookstore_storefront::db::{BookInput, BookRepository, UserRepository};
use bookstore_storefront::models::Book;

/// Base URL of a running server for HTTP tests.
#[must_use]
pub fn base_url() -> String {
    std::env::var("BOOKSTORE_BASE_URL").unwrap_or_else(|_| "http://localhost:5000".to_string())
}

/// An active book with the given price and stock.
///
/// # Panics
///
/// Panics if `price` is not a valid price.
#[must_use]
pub fn book_input(title: &str, price: &str, stock: i32) -> BookInput {
    BookInput {
        title: title.to_string(),
        author: "Test Author".to_string(),
        description: None,
        price: Price::parse(price).expect("valid test price"),
        genre: "Fiction".to_string(),
        stock,
        cover_image: None,
        isbn: None,
        publisher: None,
        pages: 100,
        is_featured: false,
        is_active: true,
    }
}

/// Insert a book.
///
/// # Panics
///
/// Panics if the insert fails.
pub async fn create_book(pool: &PgPool, title: &str, price: &str, stock: i32) -> Book {
    BookRepository::new(pool)
        .create(&book_input(title, price, stock))
        .await
        .expect("insert book")
}

/// Insert an account. The password hash is a dummy; these accounts never log in.
///
/// # Panics
///
/// Panics if the insert fails.
pub async fn create_user(pool: &PgPool, username: &str, is_admin: bool) -> UserId {
    let name = Username::parse(username).expect("valid test username");
    let email = Email::parse(&format!("{username}@example.com")).expect("valid test email");
    UserRepository::new(pool)
        .create(&name, &email, "not-a-real-hash", is_admin)
        .await
        .expect("insert user")
        .id
}

/// Current stock of a book.
///
/// # Panics
///
/// Panics if the book is missing.
pub async fn stock_of(pool: &PgPool, book: &Book) -> i32 {
    BookRepository::new(pool)
        .get_by_id(book.id)
        .await
        .expect("query book")
        .expect("book exists")
        .stock
}
