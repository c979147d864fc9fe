//! Back-office order handling against a real database.
//!
//! Requires `DATABASE_URL`; run with `--ignored`.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use sqlx::PgPool;

use bookstore_core::{OrderId, OrderStatus, PaymentMethod, Price, UserId};
use bookstore_integration_tests::{create_book, create_user};
use bookstore_storefront::services::{CartService, OrderError, OrderService};

async fn place(pool: &PgPool, user: UserId, title: &str, price: &str) -> OrderId {
    let book = create_book(pool, title, price, 5).await;
    CartService::new(pool).add(user, book.id, 1).await.unwrap();
    OrderService::new(pool)
        .place_order(user, PaymentMethod::CreditCard, "1 Main St")
        .await
        .unwrap()
        .id
}

#[sqlx::test(migrations = "../storefront/migrations")]
#[ignore = "requires PostgreSQL"]
async fn test_completed_is_terminal(pool: PgPool) {
    let user = create_user(&pool, "shopper", false).await;
    let order = place(&pool, user, "Dune", "9.99").await;
    let orders = OrderService::new(&pool);

    orders
        .update_status(order, OrderStatus::Completed)
        .await
        .unwrap();

    let err = orders
        .update_status(order, OrderStatus::Pending)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        OrderError::InvalidTransition {
            from: OrderStatus::Completed,
            to: OrderStatus::Pending
        }
    ));
}

#[sqlx::test(migrations = "../storefront/migrations")]
#[ignore = "requires PostgreSQL"]
async fn test_unknown_order(pool: PgPool) {
    let err = OrderService::new(&pool)
        .update_status(OrderId::new(999), OrderStatus::Completed)
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::NotFound));
}

#[sqlx::test(migrations = "../storefront/migrations")]
#[ignore = "requires PostgreSQL"]
async fn test_filter_and_dashboard(pool: PgPool) {
    create_user(&pool, "admin_user", true).await;
    let user = create_user(&pool, "shopper", false).await;
    let paid = place(&pool, user, "Dune", "10.00").await;
    place(&pool, user, "Emma", "4.00").await;

    let orders = OrderService::new(&pool);
    orders
        .update_status(paid, OrderStatus::Completed)
        .await
        .unwrap();

    assert_eq!(orders.list(None).await.unwrap().len(), 2);
    let pending = orders.list(Some(OrderStatus::Pending)).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].titles, "Emma");
    assert_eq!(pending[0].username, "shopper");

    let stats = orders.dashboard_stats().await.unwrap();
    assert_eq!(stats.total_users, 1);
    assert_eq!(stats.total_books, 2);
    assert_eq!(stats.total_orders, 2);
    assert_eq!(stats.pending_orders, 1);
    assert_eq!(stats.total_revenue, Price::parse("10.00").unwrap());
}
