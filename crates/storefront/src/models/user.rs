//! User domain types.

use chrono::{DateTime, Utc};

use bookstore_core::{Email, UserId, Username};

/// A registered account. Admins and shoppers share the table.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub email: Email,
    /// Admin accounts may log into the back-office and switch modes.
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}
