//! Per-page layout context: who is logged in and which flashes to show.
//!
//! Loaded explicitly by handlers that render a template. Redirecting
//! handlers never load it, so queued flashes survive until the next page.

use tower_sessions::Session;

use bookstore_core::SessionMode;

use crate::middleware::auth::current_user;
use crate::middleware::flash::take_flashes;
use crate::models::{CurrentUser, Flash};

/// Values every layout template needs.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    pub user: Option<CurrentUser>,
    pub flashes: Vec<Flash>,
}

impl PageContext {
    /// Read the current user and drain the flash queue.
    pub async fn load(session: &Session) -> Self {
        Self {
            user: current_user(session).await,
            flashes: take_flashes(session).await,
        }
    }

    #[must_use]
    pub const fn logged_in(&self) -> bool {
        self.user.is_some()
    }

    #[must_use]
    pub fn username(&self) -> &str {
        self.user.as_ref().map_or("", |u| u.username.as_str())
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(|u| u.is_admin)
    }

    /// Whether the header should show shopper links (cart, account).
    #[must_use]
    pub fn shopping(&self) -> bool {
        self.user.as_ref().is_some_and(CurrentUser::can_shop)
    }

    /// Whether the header should show the back-office link.
    #[must_use]
    pub fn administering(&self) -> bool {
        self.user.as_ref().is_some_and(CurrentUser::can_administer)
    }

    /// Label of the current mode for the mode switcher.
    #[must_use]
    pub fn mode_label(&self) -> &'static str {
        match self.user.as_ref().map(|u| u.mode) {
            Some(SessionMode::Admin) => "Admin mode",
            Some(SessionMode::User) => "User mode",
            None => "",
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;
    use tower_sessions::MemoryStore;

    use bookstore_core::UserId;

    use super::*;
    use crate::middleware::auth::update_current_user;
    use crate::middleware::flash::flash_success;

    #[tokio::test]
    async fn test_load_drains_flashes() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        let admin = CurrentUser {
            id: UserId::new(1),
            username: "admin".to_string(),
            is_admin: true,
            mode: SessionMode::Admin,
            login_time: Utc::now(),
        };
        update_current_user(&session, &admin).await.ok();
        flash_success(&session, "Admin login successful!").await;

        let ctx = PageContext::load(&session).await;
        assert!(ctx.logged_in());
        assert!(ctx.administering());
        assert!(!ctx.shopping());
        assert_eq!(ctx.username(), "admin");
        assert_eq!(ctx.mode_label(), "Admin mode");
        assert_eq!(ctx.flashes.len(), 1);

        assert!(PageContext::load(&session).await.flashes.is_empty());
    }

    #[test]
    fn test_anonymous_context() {
        let ctx = PageContext::default();
        assert!(!ctx.logged_in());
        assert!(!ctx.is_admin());
        assert_eq!(ctx.username(), "");
        assert_eq!(ctx.mode_label(), "");
    }
}
