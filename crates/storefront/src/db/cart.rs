//! Cart repository.

use sqlx::PgPool;

use bookstore_core::{BookId, CartItemId, Price, UserId};

use super::RepositoryError;
use crate::models::{Cart, CartLine};

#[derive(Debug, sqlx::FromRow)]
struct CartLineRow {
    id: CartItemId,
    book_id: BookId,
    title: String,
    author: String,
    cover_image: Option<String>,
    price: Price,
    stock: i32,
    is_active: bool,
    quantity: i32,
}

impl From<CartLineRow> for CartLine {
    fn from(row: CartLineRow) -> Self {
        Self {
            id: row.id,
            book_id: row.book_id,
            title: row.title,
            author: row.author,
            cover_image: row.cover_image,
            price: row.price,
            stock: row.stock,
            is_active: row.is_active,
            quantity: row.quantity,
        }
    }
}

/// Repository for cart rows. Every method is scoped to one user.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// The user's cart lines, oldest first. Lines for books taken off sale
    /// are kept so the shopper can see and remove them.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_cart(&self, user_id: UserId) -> Result<Cart, RepositoryError> {
        let rows = sqlx::query_as::<_, CartLineRow>(
            r"
            SELECT c.id, c.book_id, b.title, b.author, b.cover_image, b.price, b.stock,
                   b.is_active, c.quantity
            FROM bookstore.cart_items c
            JOIN bookstore.books b ON b.id = c.book_id
            WHERE c.user_id = $1
            ORDER BY c.created_at, c.id
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(Cart {
            lines: rows.into_iter().map(CartLine::from).collect(),
        })
    }

    /// One of the user's lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_line(
        &self,
        user_id: UserId,
        item_id: CartItemId,
    ) -> Result<Option<CartLine>, RepositoryError> {
        let row = sqlx::query_as::<_, CartLineRow>(
            r"
            SELECT c.id, c.book_id, b.title, b.author, b.cover_image, b.price, b.stock,
                   b.is_active, c.quantity
            FROM bookstore.cart_items c
            JOIN bookstore.books b ON b.id = c.book_id
            WHERE c.user_id = $1 AND c.id = $2
            ",
        )
        .bind(user_id)
        .bind(item_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(CartLine::from))
    }

    /// Quantity of a book already in the user's cart (0 if absent).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn quantity_of(&self, user_id: UserId, book_id: BookId) -> Result<i32, RepositoryError> {
        let quantity = sqlx::query_scalar::<_, i32>(
            "SELECT quantity FROM bookstore.cart_items WHERE user_id = $1 AND book_id = $2",
        )
        .bind(user_id)
        .bind(book_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(quantity.unwrap_or(0))
    }

    /// Add copies of a book, merging with an existing line. Returns the new
    /// line quantity.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn add(
        &self,
        user_id: UserId,
        book_id: BookId,
        quantity: i32,
    ) -> Result<i32, RepositoryError> {
        let total = sqlx::query_scalar::<_, i32>(
            r"
            INSERT INTO bookstore.cart_items AS c (user_id, book_id, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, book_id)
            DO UPDATE SET quantity = c.quantity + EXCLUDED.quantity
            RETURNING quantity
            ",
        )
        .bind(user_id)
        .bind(book_id)
        .bind(quantity)
        .fetch_one(self.pool)
        .await?;

        Ok(total)
    }

    /// Set a line's quantity.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user has no such line.
    pub async fn set_quantity(
        &self,
        user_id: UserId,
        item_id: CartItemId,
        quantity: i32,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE bookstore.cart_items SET quantity = $3 WHERE user_id = $1 AND id = $2",
        )
        .bind(user_id)
        .bind(item_id)
        .bind(quantity)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Delete a line. Returns whether a row was removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn remove(&self, user_id: UserId, item_id: CartItemId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM bookstore.cart_items WHERE user_id = $1 AND id = $2")
            .bind(user_id)
            .bind(item_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
