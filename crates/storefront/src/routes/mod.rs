//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                          - Home page
//! GET  /health, /health/ready     - Health checks (see main.rs)
//!
//! # Catalogue
//! GET  /books/genre/{genre}       - Genre listing
//! GET  /books/{id}                - Book detail
//! GET  /search?q=                 - Search
//!
//! # Auth
//! GET  /register, POST /register  - Registration
//! GET  /login,    POST /login     - Shopper login
//! GET  /logout                    - Shopper logout
//! GET  /session/switch-to-user    - Admin browses as shopper
//! GET  /session/switch-to-admin   - Back to the back-office
//!
//! # Shopping (user mode)
//! GET  /cart                      - Cart page
//! POST /cart/add                  - Add a book
//! POST /cart/update               - Set a line's quantity
//! POST /cart/remove               - Remove a line
//! GET  /checkout, POST /checkout  - Review and place order
//! GET  /payment,  POST /payment   - Payment stub
//! GET  /orders/{id}               - Order confirmation
//! GET  /account                   - Profile and order history
//!
//! # Back-office (admin mode)
//! /admin/...                      - See `admin` module
//! ```

pub mod account;
pub mod admin;
pub mod auth;
pub mod books;
pub mod cart;
pub mod checkout;
pub mod home;
pub mod search;
pub mod views;

use axum::{
    Router,
    response::{IntoResponse, Response},
    routing::{get, post},
};

use crate::error::AppError;
use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// Create the auth routes router. Credential submissions are rate limited.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/login",
            get(auth::login_page).merge(post(auth::login).layer(auth_rate_limiter())),
        )
        .route(
            "/register",
            get(auth::register_page).merge(post(auth::register).layer(auth_rate_limiter())),
        )
        .route("/logout", get(auth::logout))
        .route("/session/switch-to-user", get(auth::switch_to_user))
        .route("/session/switch-to-admin", get(auth::switch_to_admin))
}

/// Create the catalogue routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/books/genre/{genre}", get(books::genre))
        .route("/books/{id}", get(books::show))
        .route("/search", get(search::search))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
}

/// Create the checkout, payment and account routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/checkout", get(checkout::review).post(checkout::place_order))
        .route("/payment", get(checkout::payment_page).post(checkout::pay))
        .route("/orders/{id}", get(checkout::show_order))
        .route("/account", get(account::index))
}

/// Fallback for unknown routes.
pub async fn not_found() -> Response {
    AppError::NotFound("route".to_string()).into_response()
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(catalog_routes())
        .merge(auth_routes())
        .nest("/cart", cart_routes())
        .merge(order_routes())
        .nest("/admin", admin::routes())
        .fallback(not_found)
}
