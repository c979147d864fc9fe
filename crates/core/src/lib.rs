//! Bookstore Core - domain types shared by the web application and tooling.
//!
//! This crate is used by:
//! - `storefront` - the shop and admin web application
//! - `cli` - migrations, seeding and account management
//!
//! # Architecture
//!
//! Only types and pure logic live here: no I/O, no database access, no HTTP.
//! Database encode/decode impls are gated behind the `postgres` feature.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, emails, usernames, prices and status enums
//! - [`checkout`] - Turns locked cart lines into a validated order plan

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod checkout;
pub mod types;

pub use checkout::{CheckoutError, CheckoutLine, CheckoutPlan, PlannedItem};
pub use types::*;
