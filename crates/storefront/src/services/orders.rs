//! Order service: checkout, payment and order status changes.
//!
//! # Checkout
//!
//! [`OrderService::place_order`] runs the whole cart-to-order conversion in a
//! single transaction:
//!
//! 1. lock the shopper's cart rows and their books (`FOR UPDATE`, book id order)
//! 2. plan the order with [`CheckoutPlan::build`]
//! 3. insert the order and its items, decrement stock with a guarded update
//! 4. clear the cart and commit
//!
//! Any early return drops the transaction, which rolls it back, so a failed
//! checkout leaves cart and stock untouched.

use sqlx::PgPool;
use thiserror::Error;
use tracing::instrument;

use bookstore_core::{CheckoutError, CheckoutPlan, OrderId, OrderStatus, PaymentMethod, UserId};

use crate::db::orders::{
    clear_cart, decrement_stock, insert_item, insert_order, lock_checkout_lines,
};
use crate::db::{DashboardStats, OrderRepository, RepositoryError};
use crate::models::{Order, OrderItem, OrderSummary};

/// Errors from order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Please enter shipping address")]
    MissingShippingAddress,
    #[error(transparent)]
    Checkout(#[from] CheckoutError),
    #[error("Order not found")]
    NotFound,
    #[error("Cannot change order status from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for OrderError {
    fn from(e: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(e))
    }
}

/// An order with its items, for confirmation pages.
#[derive(Debug, Clone)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Order service.
pub struct OrderService<'a> {
    pool: &'a PgPool,
    orders: OrderRepository<'a>,
}

impl<'a> OrderService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            pool,
            orders: OrderRepository::new(pool),
        }
    }

    /// Turn the shopper's cart into a pending order.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::MissingShippingAddress` for a blank address,
    /// `OrderError::Checkout` when the cart cannot be fulfilled, and
    /// `OrderError::Repository` for database failures. In every error case
    /// nothing is written.
    #[instrument(skip(self, shipping_address))]
    pub async fn place_order(
        &self,
        user_id: UserId,
        payment_method: PaymentMethod,
        shipping_address: &str,
    ) -> Result<Order, OrderError> {
        let shipping_address = shipping_address.trim();
        if shipping_address.is_empty() {
            return Err(OrderError::MissingShippingAddress);
        }

        let mut tx = self.pool.begin().await?;

        let lines = lock_checkout_lines(&mut *tx, user_id).await?;
        let plan = CheckoutPlan::build(&lines)?;

        let order = insert_order(
            &mut *tx,
            user_id,
            plan.total(),
            payment_method,
            shipping_address,
        )
        .await?;

        for item in plan.items() {
            insert_item(&mut *tx, order.id, item).await?;
            if !decrement_stock(&mut *tx, item.book_id, item.quantity).await? {
                // Rows are locked, so this only trips if the plan and the
                // table disagree. Dropping `tx` rolls back.
                return Err(CheckoutError::InsufficientStock {
                    title: item.title.clone(),
                    requested: item.quantity,
                    available: 0,
                }
                .into());
            }
        }

        clear_cart(&mut *tx, user_id).await?;
        tx.commit().await?;

        tracing::info!(
            order_id = %order.id,
            total = %order.total,
            items = plan.item_count(),
            "Order placed"
        );
        Ok(order)
    }

    /// A pending order awaiting payment, if it is the shopper's.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` if the order is missing, not theirs or
    /// no longer pending.
    pub async fn pending_for_user(
        &self,
        order_id: OrderId,
        user_id: UserId,
    ) -> Result<Order, OrderError> {
        self.orders
            .get_for_user(order_id, user_id)
            .await?
            .filter(|o| o.status == OrderStatus::Pending)
            .ok_or(OrderError::NotFound)
    }

    /// Simulated payment: mark the shopper's pending order completed.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` if there is no such pending order.
    #[instrument(skip(self))]
    pub async fn complete_payment(
        &self,
        order_id: OrderId,
        user_id: UserId,
    ) -> Result<(), OrderError> {
        let updated = self
            .orders
            .transition(
                order_id,
                Some(user_id),
                OrderStatus::Pending,
                OrderStatus::Completed,
            )
            .await?;
        if !updated {
            return Err(OrderError::NotFound);
        }
        tracing::info!(%order_id, "Payment completed");
        Ok(())
    }

    /// An order and its items, if it is the shopper's.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` if the order is missing or not theirs.
    pub async fn for_user(
        &self,
        order_id: OrderId,
        user_id: UserId,
    ) -> Result<OrderWithItems, OrderError> {
        let order = self
            .orders
            .get_for_user(order_id, user_id)
            .await?
            .ok_or(OrderError::NotFound)?;
        let items = self.orders.items(order.id).await?;
        Ok(OrderWithItems { order, items })
    }

    /// Order history for the account page.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the query fails.
    pub async fn history(&self, user_id: UserId) -> Result<Vec<OrderSummary>, OrderError> {
        Ok(self.orders.history_for_user(user_id).await?)
    }

    // =========================================================================
    // Back-office
    // =========================================================================

    /// All orders, optionally filtered by status.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the query fails.
    pub async fn list(&self, status: Option<OrderStatus>) -> Result<Vec<OrderSummary>, OrderError> {
        Ok(self.orders.list(status).await?)
    }

    /// Most recent orders for the dashboard.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the query fails.
    pub async fn recent(&self, limit: i64) -> Result<Vec<OrderSummary>, OrderError> {
        Ok(self.orders.recent(limit).await?)
    }

    /// Dashboard counters.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the query fails.
    pub async fn dashboard_stats(&self) -> Result<DashboardStats, OrderError> {
        Ok(self.orders.dashboard_stats().await?)
    }

    /// Admin status change, restricted to allowed transitions.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` for unknown orders and
    /// `OrderError::InvalidTransition` for anything but `pending -> completed`.
    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        order_id: OrderId,
        next: OrderStatus,
    ) -> Result<(), OrderError> {
        let order = self
            .orders
            .get_by_id(order_id)
            .await?
            .ok_or(OrderError::NotFound)?;

        if !order.status.can_transition_to(next) {
            return Err(OrderError::InvalidTransition {
                from: order.status,
                to: next,
            });
        }

        // Guarded on the old status in case a payment landed in between.
        let updated = self
            .orders
            .transition(order_id, None, order.status, next)
            .await?;
        if !updated {
            return Err(OrderError::InvalidTransition {
                from: order.status,
                to: next,
            });
        }

        tracing::info!(%order_id, from = %order.status, to = %next, "Order status updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkout_errors_pass_through_display() {
        let err = OrderError::from(CheckoutError::EmptyCart);
        assert_eq!(err.to_string(), "Your cart is empty");
    }

    #[test]
    fn test_invalid_transition_message() {
        let err = OrderError::InvalidTransition {
            from: OrderStatus::Completed,
            to: OrderStatus::Pending,
        };
        assert_eq!(
            err.to_string(),
            "Cannot change order status from completed to pending"
        );
    }
}
