//! Domain models for the bookstore.
//!
//! These are validated domain objects, separate from the database row types
//! in [`crate::db`].

pub mod book;
pub mod cart;
pub mod order;
pub mod session;
pub mod user;

pub use book::Book;
pub use cart::{Cart, CartLine};
pub use order::{Order, OrderItem, OrderSummary};
pub use session::{CurrentUser, Flash, FlashLevel};
pub use user::User;
