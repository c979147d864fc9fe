//! Authentication extractors.
//!
//! - [`RequireShopper`]: any session in user mode (shoppers, and admins who
//!   switched to user mode)
//! - [`RequireAdmin`]: admin accounts in admin mode
//! - [`OptionalAuth`]: whoever is logged in, if anyone
//!
//! Rejections flash an explanation and redirect to the matching login page.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::middleware::flash::flash_error;
use crate::models::CurrentUser;
use crate::models::session::keys;

/// Error returned when a guard rejects the request.
#[derive(Debug, PartialEq, Eq)]
pub enum AuthRejection {
    /// Redirect to the shopper login page.
    RedirectToLogin,
    /// Redirect to the admin login page.
    RedirectToAdminLogin,
    /// No session layer is installed.
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/login").into_response(),
            Self::RedirectToAdminLogin => Redirect::to("/admin/login").into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

/// Read the logged-in user from the session.
pub async fn current_user(session: &Session) -> Option<CurrentUser> {
    session
        .get::<CurrentUser>(keys::CURRENT_USER)
        .await
        .ok()
        .flatten()
}

/// Why a session failed the shopper guard, if it did.
fn shopper_denial(user: Option<&CurrentUser>) -> Option<&'static str> {
    match user {
        None => Some("Please login to access this page"),
        Some(u) if !u.can_shop() => Some("Please login as user to access store features"),
        Some(_) => None,
    }
}

/// Why a session failed the admin guard, if it did.
fn admin_denial(user: Option<&CurrentUser>) -> Option<&'static str> {
    match user {
        None => Some("Please login to access this page"),
        Some(u) if !u.can_administer() => Some("Admin access required. Please login as admin."),
        Some(_) => None,
    }
}

/// Extractor that requires a session in user mode.
///
/// # Example
///
/// ```rust,ignore
/// async fn cart(RequireShopper(user): RequireShopper) -> impl IntoResponse {
///     format!("{}'s cart", user.username)
/// }
/// ```
pub struct RequireShopper(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireShopper
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::Unauthorized)?;

        let user = current_user(session).await;
        if let Some(message) = shopper_denial(user.as_ref()) {
            flash_error(session, message).await;
            return Err(AuthRejection::RedirectToLogin);
        }
        user.map(Self).ok_or(AuthRejection::RedirectToLogin)
    }
}

/// Extractor that requires an admin account in admin mode.
pub struct RequireAdmin(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::Unauthorized)?;

        let user = current_user(session).await;
        if let Some(message) = admin_denial(user.as_ref()) {
            flash_error(session, message).await;
            return Err(AuthRejection::RedirectToAdminLogin);
        }
        user.map(Self).ok_or(AuthRejection::RedirectToAdminLogin)
    }
}

/// Extractor that optionally gets the current user.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => current_user(session).await,
            None => None,
        };
        Ok(Self(user))
    }
}

/// Store the logged-in user under a fresh session id.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(keys::CURRENT_USER, user).await
}

/// Overwrite the stored user without cycling the id (mode switches).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn update_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(keys::CURRENT_USER, user).await
}

/// Drop everything in the session and issue a new id (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn end_session(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.clear().await;
    session.cycle_id().await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::Request;
    use chrono::Utc;
    use tower_sessions::MemoryStore;

    use bookstore_core::{SessionMode, UserId};

    use super::*;
    use crate::middleware::flash::take_flashes;

    fn user(is_admin: bool, mode: SessionMode) -> CurrentUser {
        CurrentUser {
            id: UserId::new(7),
            username: "john_doe".to_string(),
            is_admin,
            mode,
            login_time: Utc::now(),
        }
    }

    async fn parts_with(current: Option<&CurrentUser>) -> (Parts, Session) {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        if let Some(u) = current {
            update_current_user(&session, u).await.ok();
        }
        let (mut parts, ()) = Request::builder()
            .uri("/cart")
            .body(())
            .map(Request::into_parts)
            .unwrap_or_else(|_| unreachable!());
        parts.extensions.insert(session.clone());
        (parts, session)
    }

    #[test]
    fn test_shopper_denial_messages() {
        assert!(shopper_denial(None).is_some());
        assert!(shopper_denial(Some(&user(false, SessionMode::User))).is_none());
        assert!(shopper_denial(Some(&user(true, SessionMode::User))).is_none());
        assert_eq!(
            shopper_denial(Some(&user(true, SessionMode::Admin))),
            Some("Please login as user to access store features")
        );
    }

    #[test]
    fn test_admin_denial_messages() {
        assert!(admin_denial(Some(&user(true, SessionMode::Admin))).is_none());
        assert!(admin_denial(Some(&user(true, SessionMode::User))).is_some());
        assert!(admin_denial(Some(&user(false, SessionMode::Admin))).is_some());
        assert!(admin_denial(None).is_some());
    }

    #[tokio::test]
    async fn test_require_shopper_accepts_user_mode() {
        let (mut parts, _session) = parts_with(Some(&user(false, SessionMode::User))).await;
        let result = RequireShopper::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Ok(RequireShopper(u)) if u.username == "john_doe"));
    }

    #[tokio::test]
    async fn test_require_shopper_rejects_admin_mode_with_flash() {
        let (mut parts, session) = parts_with(Some(&user(true, SessionMode::Admin))).await;
        let result = RequireShopper::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AuthRejection::RedirectToLogin)));
        assert_eq!(take_flashes(&session).await.len(), 1);
    }

    #[tokio::test]
    async fn test_require_admin_rejects_shopper() {
        let (mut parts, _session) = parts_with(Some(&user(false, SessionMode::User))).await;
        let result = RequireAdmin::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AuthRejection::RedirectToAdminLogin)));
    }

    #[tokio::test]
    async fn test_require_admin_rejects_anonymous() {
        let (mut parts, _session) = parts_with(None).await;
        let result = RequireAdmin::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AuthRejection::RedirectToAdminLogin)));
    }

    #[tokio::test]
    async fn test_missing_session_layer_is_unauthorized() {
        let (mut parts, ()) = Request::builder()
            .uri("/admin")
            .body(())
            .map(Request::into_parts)
            .unwrap_or_else(|_| unreachable!());
        let result = RequireAdmin::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AuthRejection::Unauthorized)));

        let OptionalAuth(user) = OptionalAuth::from_request_parts(&mut parts, &())
            .await
            .unwrap_or_else(|e| match e {});
        assert!(user.is_none());
    }

    #[test]
    fn test_rejection_redirect_targets() {
        let response = AuthRejection::RedirectToAdminLogin.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get("location").and_then(|v| v.to_str().ok()),
            Some("/admin/login")
        );
    }
}
