//! Order repository.
//!
//! Pool-backed reads and admin writes live on [`OrderRepository`]. The
//! checkout steps are free functions over a `PgConnection` so the service can
//! run them inside one transaction.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use bookstore_core::{
    BookId, CheckoutLine, OrderId, OrderItemId, OrderStatus, PaymentMethod, PlannedItem, Price,
    UserId,
};

use super::RepositoryError;
use crate::models::{Order, OrderItem, OrderSummary};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    user_id: UserId,
    total_amount: Price,
    status: OrderStatus,
    payment_method: PaymentMethod,
    shipping_address: String,
    created_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            total: row.total_amount,
            status: row.status,
            payment_method: row.payment_method,
            shipping_address: row.shipping_address,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    id: OrderItemId,
    book_id: BookId,
    title: String,
    author: String,
    quantity: i32,
    price: Price,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        Self {
            id: row.id,
            book_id: row.book_id,
            title: row.title,
            author: row.author,
            quantity: row.quantity,
            price: row.price,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderSummaryRow {
    id: OrderId,
    username: String,
    total_amount: Price,
    status: OrderStatus,
    payment_method: PaymentMethod,
    created_at: DateTime<Utc>,
    titles: String,
    item_count: i64,
}

impl From<OrderSummaryRow> for OrderSummary {
    fn from(row: OrderSummaryRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            total: row.total_amount,
            status: row.status,
            payment_method: row.payment_method,
            created_at: row.created_at,
            titles: row.titles,
            item_count: row.item_count,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CheckoutLineRow {
    book_id: BookId,
    title: String,
    price: Price,
    stock: i32,
    is_active: bool,
    quantity: i32,
}

impl From<CheckoutLineRow> for CheckoutLine {
    fn from(row: CheckoutLineRow) -> Self {
        Self {
            book_id: row.book_id,
            title: row.title,
            price: row.price,
            stock: row.stock,
            active: row.is_active,
            quantity: row.quantity,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct DashboardStatsRow {
    total_users: i64,
    total_books: i64,
    total_orders: i64,
    total_revenue: Decimal,
    pending_orders: i64,
}

/// Headline numbers for the admin dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardStats {
    /// Non-admin accounts.
    pub total_users: i64,
    pub total_books: i64,
    pub total_orders: i64,
    /// Sum of completed order totals.
    pub total_revenue: Price,
    pub pending_orders: i64,
}

/// Shared SELECT for order listings; callers append WHERE/ORDER/LIMIT.
const SUMMARY_SELECT: &str = r"
    SELECT o.id, u.username, o.total_amount, o.status, o.payment_method, o.created_at,
           COALESCE(string_agg(b.title, ', ' ORDER BY oi.id), '') AS titles,
           COALESCE(SUM(oi.quantity), 0)::BIGINT AS item_count
    FROM bookstore.orders o
    JOIN bookstore.users u ON u.id = o.user_id
    LEFT JOIN bookstore.order_items oi ON oi.order_id = o.id
    LEFT JOIN bookstore.books b ON b.id = oi.book_id
";

// =============================================================================
// Repository
// =============================================================================

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, user_id, total_amount, status, payment_method, shipping_address, created_at
            FROM bookstore.orders
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Order::from))
    }

    /// Get an order only if it belongs to `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_for_user(
        &self,
        id: OrderId,
        user_id: UserId,
    ) -> Result<Option<Order>, RepositoryError> {
        Ok(self.get_by_id(id).await?.filter(|o| o.user_id == user_id))
    }

    /// Items of an order with their book titles.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items(&self, order_id: OrderId) -> Result<Vec<OrderItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderItemRow>(
            r"
            SELECT oi.id, oi.book_id, b.title, b.author, oi.quantity, oi.price
            FROM bookstore.order_items oi
            JOIN bookstore.books b ON b.id = oi.book_id
            WHERE oi.order_id = $1
            ORDER BY oi.id
            ",
        )
        .bind(order_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(OrderItem::from).collect())
    }

    /// A shopper's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn history_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<OrderSummary>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderSummaryRow>(&format!(
            "{SUMMARY_SELECT}
             WHERE o.user_id = $1
             GROUP BY o.id, u.username
             ORDER BY o.created_at DESC, o.id DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(OrderSummary::from).collect())
    }

    /// All orders, optionally filtered by status, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        status: Option<OrderStatus>,
    ) -> Result<Vec<OrderSummary>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderSummaryRow>(&format!(
            "{SUMMARY_SELECT}
             WHERE ($1::bookstore.order_status IS NULL OR o.status = $1)
             GROUP BY o.id, u.username
             ORDER BY o.created_at DESC, o.id DESC"
        ))
        .bind(status)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(OrderSummary::from).collect())
    }

    /// Most recent orders across all users.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn recent(&self, limit: i64) -> Result<Vec<OrderSummary>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderSummaryRow>(&format!(
            "{SUMMARY_SELECT}
             GROUP BY o.id, u.username
             ORDER BY o.created_at DESC, o.id DESC
             LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(OrderSummary::from).collect())
    }

    /// Move an order from `from` to `to`. Returns `false` if the order was not
    /// in `from` (or, with `user_id`, not owned by that user).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn transition(
        &self,
        id: OrderId,
        user_id: Option<UserId>,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE bookstore.orders SET status = $4
            WHERE id = $1 AND ($2::INTEGER IS NULL OR user_id = $2) AND status = $3
            ",
        )
        .bind(id)
        .bind(user_id)
        .bind(from)
        .bind(to)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Dashboard counters in one round trip.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if revenue is negative.
    pub async fn dashboard_stats(&self) -> Result<DashboardStats, RepositoryError> {
        let row = sqlx::query_as::<_, DashboardStatsRow>(
            r"
            SELECT
                (SELECT COUNT(*) FROM bookstore.users WHERE NOT is_admin) AS total_users,
                (SELECT COUNT(*) FROM bookstore.books) AS total_books,
                (SELECT COUNT(*) FROM bookstore.orders) AS total_orders,
                (SELECT COALESCE(SUM(total_amount), 0) FROM bookstore.orders
                    WHERE status = 'completed') AS total_revenue,
                (SELECT COUNT(*) FROM bookstore.orders WHERE status = 'pending') AS pending_orders
            ",
        )
        .fetch_one(self.pool)
        .await?;

        let total_revenue = Price::new(row.total_revenue).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid revenue total: {e}"))
        })?;

        Ok(DashboardStats {
            total_users: row.total_users,
            total_books: row.total_books,
            total_orders: row.total_orders,
            total_revenue,
            pending_orders: row.pending_orders,
        })
    }
}

// =============================================================================
// Checkout steps (run inside the caller's transaction)
// =============================================================================

/// Lock the user's cart rows and their books, in book id order.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn lock_checkout_lines(
    conn: &mut PgConnection,
    user_id: UserId,
) -> Result<Vec<CheckoutLine>, RepositoryError> {
    let rows = sqlx::query_as::<_, CheckoutLineRow>(
        r"
        SELECT c.book_id, b.title, b.price, b.stock, b.is_active, c.quantity
        FROM bookstore.cart_items c
        JOIN bookstore.books b ON b.id = c.book_id
        WHERE c.user_id = $1
        ORDER BY c.book_id
        FOR UPDATE
        ",
    )
    .bind(user_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows.into_iter().map(CheckoutLine::from).collect())
}

/// Insert a pending order.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails.
pub async fn insert_order(
    conn: &mut PgConnection,
    user_id: UserId,
    total: Price,
    payment_method: PaymentMethod,
    shipping_address: &str,
) -> Result<Order, RepositoryError> {
    let row = sqlx::query_as::<_, OrderRow>(
        r"
        INSERT INTO bookstore.orders (user_id, total_amount, status, payment_method, shipping_address)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, user_id, total_amount, status, payment_method, shipping_address, created_at
        ",
    )
    .bind(user_id)
    .bind(total)
    .bind(OrderStatus::Pending)
    .bind(payment_method)
    .bind(shipping_address)
    .fetch_one(&mut *conn)
    .await?;

    Ok(Order::from(row))
}

/// Insert one order item at its planned price.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails.
pub async fn insert_item(
    conn: &mut PgConnection,
    order_id: OrderId,
    item: &PlannedItem,
) -> Result<(), RepositoryError> {
    sqlx::query(
        r"
        INSERT INTO bookstore.order_items (order_id, book_id, quantity, price)
        VALUES ($1, $2, $3, $4)
        ",
    )
    .bind(order_id)
    .bind(item.book_id)
    .bind(item.quantity)
    .bind(item.unit_price)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Take `quantity` copies out of stock. Returns `false` when fewer remain.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the update fails.
pub async fn decrement_stock(
    conn: &mut PgConnection,
    book_id: BookId,
    quantity: i32,
) -> Result<bool, RepositoryError> {
    let result = sqlx::query(
        "UPDATE bookstore.books SET stock = stock - $2 WHERE id = $1 AND stock >= $2",
    )
    .bind(book_id)
    .bind(quantity)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Empty the user's cart.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the delete fails.
pub async fn clear_cart(conn: &mut PgConnection, user_id: UserId) -> Result<u64, RepositoryError> {
    let result = sqlx::query("DELETE FROM bookstore.cart_items WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}
