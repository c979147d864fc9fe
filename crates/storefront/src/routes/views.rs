//! Template-ready views of domain types.
//!
//! Templates only print strings; prices, dates and cover paths are formatted
//! here once.

use chrono::{DateTime, Utc};

use crate::models::{Book, CartLine, OrderItem, OrderSummary};

/// Cover shown when a book has none.
pub const DEFAULT_COVER: &str = "/static/covers/default.svg";

/// Public URL for a cover file name.
#[must_use]
pub fn cover_url(cover_image: Option<&str>) -> String {
    match cover_image.map(str::trim) {
        Some(name) if !name.is_empty() && !name.contains('/') && !name.contains("..") => {
            format!("/static/covers/{name}")
        }
        _ => DEFAULT_COVER.to_string(),
    }
}

/// Date as shown in listings.
#[must_use]
pub fn format_date(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}

/// A book tile on listing pages.
#[derive(Debug, Clone)]
pub struct BookCard {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub price: String,
    pub cover_url: String,
    pub in_stock: bool,
}

impl From<&Book> for BookCard {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id.as_i32(),
            title: book.title.clone(),
            author: book.author.clone(),
            genre: book.genre.clone(),
            price: book.price.to_string(),
            cover_url: cover_url(book.cover_image.as_deref()),
            in_stock: book.in_stock(),
        }
    }
}

/// Convert a slice of books into cards.
#[must_use]
pub fn cards(books: &[Book]) -> Vec<BookCard> {
    books.iter().map(BookCard::from).collect()
}

/// Everything the detail page shows about a book.
#[derive(Debug, Clone)]
pub struct BookView {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub description: String,
    pub price: String,
    pub stock: i32,
    pub cover_url: String,
    pub isbn: String,
    pub publisher: String,
    pub pages: i32,
    pub in_stock: bool,
}

impl From<&Book> for BookView {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id.as_i32(),
            title: book.title.clone(),
            author: book.author.clone(),
            genre: book.genre.clone(),
            description: book.description.clone().unwrap_or_default(),
            price: book.price.to_string(),
            stock: book.stock,
            cover_url: cover_url(book.cover_image.as_deref()),
            isbn: book.isbn.clone().unwrap_or_default(),
            publisher: book.publisher.clone().unwrap_or_default(),
            pages: book.pages,
            in_stock: book.in_stock(),
        }
    }
}

/// A cart row.
#[derive(Debug, Clone)]
pub struct CartLineView {
    pub id: i32,
    pub book_id: i32,
    pub title: String,
    pub author: String,
    pub cover_url: String,
    pub price: String,
    pub quantity: i32,
    pub stock: i32,
    pub subtotal: String,
    pub over_stock: bool,
    /// False when the book was taken off sale; the line can only be removed.
    pub available: bool,
}

impl From<&CartLine> for CartLineView {
    fn from(line: &CartLine) -> Self {
        Self {
            id: line.id.as_i32(),
            book_id: line.book_id.as_i32(),
            title: line.title.clone(),
            author: line.author.clone(),
            cover_url: cover_url(line.cover_image.as_deref()),
            price: line.price.to_string(),
            quantity: line.quantity,
            stock: line.stock,
            subtotal: line.subtotal().to_string(),
            over_stock: line.is_active && !line.within_stock(),
            available: line.is_active,
        }
    }
}

/// An order line on the confirmation page.
#[derive(Debug, Clone)]
pub struct OrderItemView {
    pub book_id: i32,
    pub title: String,
    pub author: String,
    pub quantity: i32,
    pub price: String,
    pub subtotal: String,
}

impl From<&OrderItem> for OrderItemView {
    fn from(item: &OrderItem) -> Self {
        Self {
            book_id: item.book_id.as_i32(),
            title: item.title.clone(),
            author: item.author.clone(),
            quantity: item.quantity,
            price: item.price.to_string(),
            subtotal: item.subtotal().to_string(),
        }
    }
}

/// An order in a listing.
#[derive(Debug, Clone)]
pub struct OrderRowView {
    pub id: i32,
    pub username: String,
    pub total: String,
    pub status: String,
    pub is_pending: bool,
    pub payment_method: String,
    pub created_at: String,
    pub titles: String,
    pub item_count: i64,
}

impl From<&OrderSummary> for OrderRowView {
    fn from(order: &OrderSummary) -> Self {
        Self {
            id: order.id.as_i32(),
            username: order.username.clone(),
            total: order.total.to_string(),
            status: order.status.to_string(),
            is_pending: order.status == bookstore_core::OrderStatus::Pending,
            payment_method: order.payment_method.label().to_string(),
            created_at: format_date(order.created_at),
            titles: order.titles.clone(),
            item_count: order.item_count,
        }
    }
}

/// Convert order summaries into rows.
#[must_use]
pub fn order_rows(orders: &[OrderSummary]) -> Vec<OrderRowView> {
    orders.iter().map(OrderRowView::from).collect()
}

/// A `<select>` option.
#[derive(Debug, Clone)]
pub struct SelectOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bookstore_core::{BookId, OrderId, OrderStatus, PaymentMethod, Price};
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_cover_url() {
        assert_eq!(
            cover_url(Some("great_gatsby.svg")),
            "/static/covers/great_gatsby.svg"
        );
        assert_eq!(cover_url(None), DEFAULT_COVER);
        assert_eq!(cover_url(Some("  ")), DEFAULT_COVER);
        assert_eq!(cover_url(Some("../config.rs")), DEFAULT_COVER);
    }

    #[test]
    fn test_book_card_formats_price() {
        let book = Book {
            id: BookId::new(3),
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            description: None,
            price: Price::parse("9.5").unwrap(),
            genre: "Science Fiction".to_string(),
            stock: 0,
            cover_image: None,
            isbn: None,
            publisher: None,
            pages: 0,
            is_featured: false,
            is_active: true,
            created_at: Utc::now(),
        };
        let card = BookCard::from(&book);
        assert_eq!(card.id, 3);
        assert_eq!(card.price, "$9.50");
        assert!(!card.in_stock);
        assert_eq!(BookView::from(&book).description, "");
    }

    #[test]
    fn test_order_row_labels() {
        let summary = OrderSummary {
            id: OrderId::new(12),
            username: "john_doe".to_string(),
            total: Price::parse("25.98").unwrap(),
            status: OrderStatus::Pending,
            payment_method: PaymentMethod::Paypal,
            created_at: Utc.with_ymd_and_hms(2025, 3, 1, 14, 30, 0).unwrap(),
            titles: "Dune, Emma".to_string(),
            item_count: 2,
        };
        let row = OrderRowView::from(&summary);
        assert_eq!(row.payment_method, "PayPal");
        assert_eq!(row.status, "pending");
        assert!(row.is_pending);
        assert_eq!(row.created_at, "2025-03-01 14:30");
    }
}
