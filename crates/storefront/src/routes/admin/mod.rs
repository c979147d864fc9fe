//! Back-office route handlers.
//!
//! Everything except the login page requires an admin account in admin
//! mode (see [`crate::middleware::RequireAdmin`]).

pub mod auth;
pub mod books;
pub mod dashboard;
pub mod orders;
pub mod users;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// Create the back-office router, nested under `/admin`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::dashboard))
        .route(
            "/login",
            get(auth::login_page).merge(post(auth::login).layer(auth_rate_limiter())),
        )
        .route("/logout", get(auth::logout))
        .route("/books", get(books::index))
        .route("/books/new", get(books::new_page).post(books::create))
        .route("/books/{id}/edit", get(books::edit_page).post(books::update))
        .route("/users", get(users::index))
        .route("/orders", get(orders::index))
        .route("/orders/{id}/status", post(orders::update_status))
}
