//! Book domain type.

use chrono::{DateTime, Utc};

use bookstore_core::{BookId, Price};

/// A catalogue entry.
#[derive(Debug, Clone)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub description: Option<String>,
    pub price: Price,
    pub genre: String,
    /// Copies on hand. Never negative.
    pub stock: i32,
    /// File name under `/static/covers/`.
    pub cover_image: Option<String>,
    pub isbn: Option<String>,
    pub publisher: Option<String>,
    pub pages: i32,
    pub is_featured: bool,
    /// Inactive books are hidden from the shop but kept for order history.
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Book {
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }
}
