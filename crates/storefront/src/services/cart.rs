//! Cart service: stock-aware cart edits.
//!
//! Stock is only checked here, never reserved. The authoritative check
//! happens again under row locks at checkout.

use sqlx::PgPool;
use thiserror::Error;
use tracing::instrument;

use bookstore_core::{BookId, CartItemId, UserId};

use crate::db::{BookRepository, CartRepository, RepositoryError};
use crate::models::Cart;

/// Errors from cart operations. All but `Repository` are shown to the shopper.
#[derive(Debug, Error)]
pub enum CartError {
    #[error("Book not found")]
    BookNotFound,
    #[error("Cart item not found")]
    ItemNotFound,
    #[error("Quantity must be at least 1")]
    InvalidQuantity,
    #[error("Not enough stock available")]
    InsufficientStock,
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Outcome of a quantity update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartUpdate {
    Updated,
    Removed,
}

/// Cart service.
pub struct CartService<'a> {
    books: BookRepository<'a>,
    cart: CartRepository<'a>,
}

impl<'a> CartService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            books: BookRepository::new(pool),
            cart: CartRepository::new(pool),
        }
    }

    /// The shopper's cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if the query fails.
    pub async fn get(&self, user_id: UserId) -> Result<Cart, CartError> {
        Ok(self.cart.get_cart(user_id).await?)
    }

    /// Add copies of an active book. The merged quantity may not exceed stock.
    ///
    /// # Errors
    ///
    /// Returns `CartError::BookNotFound`, `CartError::InvalidQuantity` or
    /// `CartError::InsufficientStock` for rejected requests.
    #[instrument(skip(self))]
    pub async fn add(
        &self,
        user_id: UserId,
        book_id: BookId,
        quantity: i32,
    ) -> Result<i32, CartError> {
        if quantity < 1 {
            return Err(CartError::InvalidQuantity);
        }

        let book = self
            .books
            .get_by_id(book_id)
            .await?
            .filter(|b| b.is_active)
            .ok_or(CartError::BookNotFound)?;

        let existing = self.cart.quantity_of(user_id, book_id).await?;
        if existing.saturating_add(quantity) > book.stock {
            return Err(CartError::InsufficientStock);
        }

        let total = self.cart.add(user_id, book_id, quantity).await?;
        tracing::info!(%book_id, quantity, line_quantity = total, "Added to cart");
        Ok(total)
    }

    /// Set a line's quantity; zero removes the line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ItemNotFound` if the line isn't the shopper's,
    /// `CartError::InvalidQuantity` for negatives and
    /// `CartError::InsufficientStock` above current stock.
    #[instrument(skip(self))]
    pub async fn update(
        &self,
        user_id: UserId,
        item_id: CartItemId,
        quantity: i32,
    ) -> Result<CartUpdate, CartError> {
        if quantity < 0 {
            return Err(CartError::InvalidQuantity);
        }
        if quantity == 0 {
            return if self.cart.remove(user_id, item_id).await? {
                Ok(CartUpdate::Removed)
            } else {
                Err(CartError::ItemNotFound)
            };
        }

        let line = self
            .cart
            .get_line(user_id, item_id)
            .await?
            .ok_or(CartError::ItemNotFound)?;
        if !line.is_active {
            return Err(CartError::BookNotFound);
        }
        if quantity > line.stock {
            return Err(CartError::InsufficientStock);
        }

        self.cart
            .set_quantity(user_id, item_id, quantity)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => CartError::ItemNotFound,
                other => CartError::Repository(other),
            })?;
        Ok(CartUpdate::Updated)
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ItemNotFound` if the line isn't the shopper's.
    #[instrument(skip(self))]
    pub async fn remove(&self, user_id: UserId, item_id: CartItemId) -> Result<(), CartError> {
        if self.cart.remove(user_id, item_id).await? {
            Ok(())
        } else {
            Err(CartError::ItemNotFound)
        }
    }
}
