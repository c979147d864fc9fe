//! Order domain types.

use chrono::{DateTime, Utc};

use bookstore_core::{BookId, OrderId, OrderItemId, OrderStatus, PaymentMethod, Price, UserId};

/// A placed order.
#[derive(Debug, Clone)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub total: Price,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub shipping_address: String,
    pub created_at: DateTime<Utc>,
}

/// One line of an order, priced at purchase time.
#[derive(Debug, Clone)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub book_id: BookId,
    pub title: String,
    pub author: String,
    pub quantity: i32,
    pub price: Price,
}

impl OrderItem {
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// An order row for listings: the account page and the admin screens.
#[derive(Debug, Clone)]
pub struct OrderSummary {
    pub id: OrderId,
    pub username: String,
    pub total: Price,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub created_at: DateTime<Utc>,
    /// Titles of the books in the order, comma separated.
    pub titles: String,
    /// Total copies across all items.
    pub item_count: i64,
}
