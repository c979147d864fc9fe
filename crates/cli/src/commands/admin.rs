//! Admin account management commands.
//!
//! ```bash
//! bs-cli admin create -u alice -e alice@example.com -p 'long-password'
//! ```

use bookstore_core::UserId;
use bookstore_storefront::services::AuthService;

use super::{CommandError, connect};

/// Create a new admin account.
///
/// Goes through the same validation as registration: username and email
/// format, minimum password length, uniqueness.
///
/// # Returns
///
/// The ID of the created account.
pub async fn create_user(
    username: &str,
    email: &str,
    password: &str,
) -> Result<UserId, CommandError> {
    let pool = connect().await?;

    tracing::info!("Creating admin account: {username} ({email})");
    let user = AuthService::new(&pool)
        .create_account(username, email, password, true)
        .await?;

    tracing::info!(
        "Admin account created successfully! ID: {}, Username: {}",
        user.id,
        user.username
    );
    Ok(user.id)
}
