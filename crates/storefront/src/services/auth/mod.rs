//! Authentication service.
//!
//! Password registration and login for both shopper and admin accounts.
//! Passwords are stored as argon2id PHC strings.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;
use tracing::instrument;

use bookstore_core::{Email, Username};

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::User;

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Which login form the credentials came from.
///
/// Shopper login only accepts regular accounts and admin login only accepts
/// admin accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginKind {
    Shopper,
    Admin,
}

impl LoginKind {
    const fn accepts(self, user: &User) -> bool {
        match self {
            Self::Shopper => !user.is_admin,
            Self::Admin => user.is_admin,
        }
    }
}

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a shopper account from the sign-up form.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordMismatch` if the confirmation differs,
    /// plus everything [`Self::create_account`] can return.
    #[instrument(skip(self, password, confirm_password))]
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<User, AuthError> {
        if password != confirm_password {
            return Err(AuthError::PasswordMismatch);
        }
        self.create_account(username, email, password, false).await
    }

    /// Create an account of either kind.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidUsername` / `AuthError::InvalidEmail` for
    /// malformed input, `AuthError::WeakPassword` for short passwords and
    /// `AuthError::UserAlreadyExists` if the username or email is taken.
    #[instrument(skip(self, password))]
    pub async fn create_account(
        &self,
        username: &str,
        email: &str,
        password: &str,
        is_admin: bool,
    ) -> Result<User, AuthError> {
        let username = Username::parse(username)?;
        let email = Email::parse(email)?;
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create(&username, &email, &password_hash, is_admin)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, is_admin, "Account created");
        Ok(user)
    }

    /// Check credentials for the given login form.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for an unknown user, a wrong
    /// password, or an account the form does not accept.
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        kind: LoginKind,
    ) -> Result<User, AuthError> {
        let (user, password_hash) = self
            .users
            .get_with_password_hash(username.trim())
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        if !kind.accepts(&user) {
            tracing::warn!(user_id = %user.id, ?kind, "Login attempt with wrong account kind");
            return Err(AuthError::InvalidCredentials);
        }

        Ok(user)
    }
}

// =============================================================================
// Password Helpers
// =============================================================================

fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use bookstore_core::UserId;

    use super::*;

    fn account(is_admin: bool) -> User {
        User {
            id: UserId::new(1),
            username: Username::parse("john_doe").unwrap(),
            email: Email::parse("john@example.com").unwrap(),
            is_admin,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_validate_password_length() {
        assert!(matches!(
            validate_password("short"),
            Err(AuthError::WeakPassword(_))
        ));
        assert!(validate_password("password123").is_ok());
    }

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("password123").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("password123", &hash).is_ok());
        assert!(matches!(
            verify_password("password124", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(matches!(
            verify_password("password123", "not-a-phc-string"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_login_kind_accepts() {
        assert!(LoginKind::Shopper.accepts(&account(false)));
        assert!(!LoginKind::Shopper.accepts(&account(true)));
        assert!(LoginKind::Admin.accepts(&account(true)));
        assert!(!LoginKind::Admin.accepts(&account(false)));
    }

    #[test]
    fn test_user_messages_hide_server_faults() {
        assert_eq!(
            AuthError::UserAlreadyExists.user_message().as_deref(),
            Some("Username or email already exists")
        );
        assert!(AuthError::PasswordHash.user_message().is_none());
    }
}
