//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] bookstore_core::EmailError),

    /// Invalid username format.
    #[error("invalid username: {0}")]
    InvalidUsername(#[from] bookstore_core::UsernameError),

    /// Wrong password, unknown user, or an account of the wrong kind.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Username or email already registered.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Password and confirmation differ.
    #[error("passwords do not match")]
    PasswordMismatch,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

impl AuthError {
    /// Whether the visitor caused this error (as opposed to the server).
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        !matches!(self, Self::Repository(_) | Self::PasswordHash)
    }

    /// Message safe to flash to the visitor, or `None` for server faults.
    #[must_use]
    pub fn user_message(&self) -> Option<String> {
        match self {
            Self::InvalidEmail(e) => Some(format!("Invalid email address: {e}")),
            Self::InvalidUsername(e) => Some(format!("Invalid username: {e}")),
            Self::InvalidCredentials => Some("Invalid username or password".to_string()),
            Self::UserAlreadyExists => Some("Username or email already exists".to_string()),
            Self::WeakPassword(msg) => Some(msg.clone()),
            Self::PasswordMismatch => Some("Passwords do not match".to_string()),
            Self::Repository(_) | Self::PasswordHash => None,
        }
    }
}
