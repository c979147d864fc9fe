//! Session-related types.
//!
//! Types stored in the session for authentication state and one-shot
//! flash messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bookstore_core::{SessionMode, UserId};

/// Session-stored identity of the logged-in account.
///
/// One session serves both halves of the site. `mode` says which half the
/// session is currently acting in; only admins can be in `Admin` mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub username: String,
    pub is_admin: bool,
    pub mode: SessionMode,
    pub login_time: DateTime<Utc>,
}

impl CurrentUser {
    /// Whether the session may use shopper pages (cart, checkout, account).
    #[must_use]
    pub fn can_shop(&self) -> bool {
        self.mode == SessionMode::User
    }

    /// Whether the session may use the back-office.
    #[must_use]
    pub fn can_administer(&self) -> bool {
        self.is_admin && self.mode == SessionMode::Admin
    }

    /// Copy of this identity in another mode, or `None` for non-admins.
    #[must_use]
    pub fn switched_to(&self, mode: SessionMode) -> Option<Self> {
        self.is_admin.then(|| Self {
            mode,
            ..self.clone()
        })
    }
}

/// Severity of a flash message; doubles as the CSS class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlashLevel {
    Success,
    Info,
    Error,
}

impl FlashLevel {
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Error => "error",
        }
    }
}

/// A message shown once on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

/// Session keys.
pub mod keys {
    /// The logged-in [`super::CurrentUser`].
    pub const CURRENT_USER: &str = "current_user";

    /// Queued [`super::Flash`] messages.
    pub const FLASHES: &str = "flashes";

    /// Order placed at checkout and awaiting payment.
    pub const PENDING_ORDER_ID: &str = "pending_order_id";
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(is_admin: bool, mode: SessionMode) -> CurrentUser {
        CurrentUser {
            id: UserId::new(1),
            username: "admin".to_string(),
            is_admin,
            mode,
            login_time: Utc::now(),
        }
    }

    #[test]
    fn test_shopper_guard_depends_on_mode_only() {
        assert!(user(false, SessionMode::User).can_shop());
        assert!(user(true, SessionMode::User).can_shop());
        assert!(!user(true, SessionMode::Admin).can_shop());
    }

    #[test]
    fn test_admin_guard_requires_flag_and_mode() {
        assert!(user(true, SessionMode::Admin).can_administer());
        assert!(!user(true, SessionMode::User).can_administer());
        // A tampered session cannot reach the back-office without the flag.
        assert!(!user(false, SessionMode::Admin).can_administer());
    }

    #[test]
    fn test_switching_requires_admin_flag() {
        assert!(user(false, SessionMode::User).switched_to(SessionMode::Admin).is_none());

        let admin = user(true, SessionMode::Admin);
        let switched = admin.switched_to(SessionMode::User);
        assert_eq!(switched.as_ref().map(|u| u.mode), Some(SessionMode::User));
        assert_eq!(switched.map(|u| u.login_time), Some(admin.login_time));
    }
}
