//! One-shot flash messages stored in the session.
//!
//! Handlers push a message before redirecting; the next rendered page takes
//! (and thereby clears) the queue.

use tower_sessions::Session;

use crate::models::session::keys;
use crate::models::{Flash, FlashLevel};

/// Queue a message for the next rendered page.
///
/// A session store failure only loses the message, so it is logged and
/// otherwise ignored.
pub async fn push_flash(session: &Session, level: FlashLevel, message: impl Into<String>) {
    let mut flashes: Vec<Flash> = session
        .get(keys::FLASHES)
        .await
        .ok()
        .flatten()
        .unwrap_or_default();
    flashes.push(Flash {
        level,
        message: message.into(),
    });

    if let Err(e) = session.insert(keys::FLASHES, flashes).await {
        tracing::warn!(error = %e, "Failed to store flash message");
    }
}

/// Shorthand for an error flash.
pub async fn flash_error(session: &Session, message: impl Into<String>) {
    push_flash(session, FlashLevel::Error, message).await;
}

/// Shorthand for a success flash.
pub async fn flash_success(session: &Session, message: impl Into<String>) {
    push_flash(session, FlashLevel::Success, message).await;
}

/// Shorthand for an info flash.
pub async fn flash_info(session: &Session, message: impl Into<String>) {
    push_flash(session, FlashLevel::Info, message).await;
}

/// Remove and return all queued messages.
pub async fn take_flashes(session: &Session) -> Vec<Flash> {
    session
        .remove::<Vec<Flash>>(keys::FLASHES)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_flashes_are_taken_once_in_order() {
        let session = session();
        flash_error(&session, "Invalid username or password").await;
        flash_info(&session, "Switched to user mode").await;

        let flashes = take_flashes(&session).await;
        assert_eq!(flashes.len(), 2);
        assert_eq!(flashes.first().map(|f| f.level), Some(FlashLevel::Error));
        assert_eq!(
            flashes.get(1).map(|f| f.message.as_str()),
            Some("Switched to user mode")
        );

        assert!(take_flashes(&session).await.is_empty());
    }

    #[tokio::test]
    async fn test_take_on_empty_session() {
        assert!(take_flashes(&session()).await.is_empty());
    }
}
