//! Business logic services for the bookstore.
//!
//! # Services
//!
//! - `auth` - Registration and password login (argon2)
//! - `catalog` - Home page, genre, detail and search reads
//! - `cart` - Add/update/remove with stock checks
//! - `orders` - Transactional checkout and the payment step

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod orders;

pub use auth::{AuthError, AuthService, LoginKind};
pub use cart::{CartError, CartService, CartUpdate};
pub use catalog::{BookDetail, CatalogService, GenreShelf, HomePage};
pub use orders::{OrderError, OrderService, OrderWithItems};
