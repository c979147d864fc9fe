//! Shopper authentication and session mode route handlers.
//!
//! Registration, shopper login/logout and the admin-only switches between
//! user mode and admin mode. The back-office login lives in
//! [`crate::routes::admin::auth`].

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use bookstore_core::SessionMode;

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{
    OptionalAuth, PageContext, end_session, flash_error, flash_info, flash_success,
    set_current_user, update_current_user,
};
use crate::models::{CurrentUser, User};
use crate::services::{AuthError, AuthService, LoginKind};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data (shared by both login pages).
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub ctx: PageContext,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub ctx: PageContext,
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Store a freshly authenticated user in the session.
pub(crate) async fn start_session(
    session: &Session,
    user: &User,
    mode: SessionMode,
) -> Result<()> {
    let current = CurrentUser {
        id: user.id,
        username: user.username.to_string(),
        is_admin: user.is_admin,
        mode,
        login_time: Utc::now(),
    };
    set_current_user(session, &current).await?;
    set_sentry_user(&user.id, user.username.as_str());
    tracing::info!(user_id = %user.id, %mode, "Logged in");
    Ok(())
}

/// End the session of a logged-in user.
pub(crate) async fn finish_session(session: &Session, user: &CurrentUser) -> Result<()> {
    end_session(session).await?;
    clear_sentry_user();
    tracing::info!(user_id = %user.id, "Logged out");
    Ok(())
}

/// Flash the visitor-facing part of an auth error, or bubble server faults.
async fn flash_auth_error(session: &Session, err: AuthError) -> Result<()> {
    match err.user_message() {
        Some(message) => {
            flash_error(session, message).await;
            Ok(())
        }
        None => Err(err.into()),
    }
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page(session: Session) -> impl IntoResponse {
    RegisterTemplate {
        ctx: PageContext::load(&session).await,
    }
}

/// Handle registration form submission.
#[instrument(skip(state, session, form), fields(username = %form.username))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Result<Response> {
    let result = AuthService::new(state.pool())
        .register(
            &form.username,
            &form.email,
            &form.password,
            &form.confirm_password,
        )
        .await;

    match result {
        Ok(_) => {
            flash_success(&session, "Registration successful! Please login.").await;
            Ok(Redirect::to("/login").into_response())
        }
        Err(e) => {
            tracing::warn!(error = %e, "Registration rejected");
            flash_auth_error(&session, e).await?;
            Ok(Redirect::to("/register").into_response())
        }
    }
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the shopper login page.
pub async fn login_page(session: Session) -> impl IntoResponse {
    LoginTemplate {
        ctx: PageContext::load(&session).await,
    }
}

/// Handle shopper login. Admin accounts are refused here.
#[instrument(skip(state, session, form), fields(username = %form.username))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let result = AuthService::new(state.pool())
        .login(&form.username, &form.password, LoginKind::Shopper)
        .await;

    match result {
        Ok(user) => {
            start_session(&session, &user, SessionMode::User).await?;
            flash_success(&session, "User login successful!").await;
            Ok(Redirect::to("/").into_response())
        }
        Err(e) => {
            tracing::warn!(error = %e, "Login failed");
            flash_auth_error(&session, e).await?;
            Ok(Redirect::to("/login").into_response())
        }
    }
}

/// Log out and return to the shopper login page.
#[instrument(skip(session, user))]
pub async fn logout(session: Session, OptionalAuth(user): OptionalAuth) -> Result<Response> {
    if let Some(user) = user {
        finish_session(&session, &user).await?;
        flash_info(
            &session,
            format!("User {} has been logged out", user.username),
        )
        .await;
    }
    Ok(Redirect::to("/login").into_response())
}

// =============================================================================
// Mode Switching
// =============================================================================

/// Outcome of a mode switch request.
#[derive(Debug, PartialEq, Eq)]
enum SwitchOutcome {
    Switched(CurrentUser),
    NotLoggedIn,
    NotAdmin,
}

fn plan_switch(user: Option<&CurrentUser>, mode: SessionMode) -> SwitchOutcome {
    match user {
        None => SwitchOutcome::NotLoggedIn,
        Some(u) => u
            .switched_to(mode)
            .map_or(SwitchOutcome::NotAdmin, SwitchOutcome::Switched),
    }
}

async fn switch_mode(
    session: &Session,
    user: Option<&CurrentUser>,
    mode: SessionMode,
) -> Result<Response> {
    match plan_switch(user, mode) {
        SwitchOutcome::Switched(updated) => {
            update_current_user(session, &updated).await?;
            tracing::info!(user_id = %updated.id, %mode, "Switched session mode");
            flash_info(session, format!("Switched to {mode} mode")).await;
            let target = match mode {
                SessionMode::User => "/",
                SessionMode::Admin => "/admin",
            };
            Ok(Redirect::to(target).into_response())
        }
        SwitchOutcome::NotLoggedIn => {
            flash_error(session, "Please login first").await;
            Ok(Redirect::to("/login").into_response())
        }
        SwitchOutcome::NotAdmin => {
            flash_error(session, "Please login as admin first").await;
            Ok(Redirect::to("/admin/login").into_response())
        }
    }
}

/// Let an admin browse and buy as a shopper.
#[instrument(skip(session, user))]
pub async fn switch_to_user(session: Session, OptionalAuth(user): OptionalAuth) -> Result<Response> {
    switch_mode(&session, user.as_ref(), SessionMode::User).await
}

/// Return an admin to the back-office.
#[instrument(skip(session, user))]
pub async fn switch_to_admin(
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Result<Response> {
    switch_mode(&session, user.as_ref(), SessionMode::Admin).await
}

#[cfg(test)]
mod tests {
    use bookstore_core::UserId;

    use super::*;

    fn user(is_admin: bool) -> CurrentUser {
        CurrentUser {
            id: UserId::new(1),
            username: "admin".to_string(),
            is_admin,
            mode: SessionMode::Admin,
            login_time: Utc::now(),
        }
    }

    #[test]
    fn test_switch_requires_login() {
        assert_eq!(
            plan_switch(None, SessionMode::User),
            SwitchOutcome::NotLoggedIn
        );
    }

    #[test]
    fn test_switch_requires_admin_flag() {
        assert_eq!(
            plan_switch(Some(&user(false)), SessionMode::Admin),
            SwitchOutcome::NotAdmin
        );
    }

    #[test]
    fn test_admin_switches_to_user_mode() {
        let outcome = plan_switch(Some(&user(true)), SessionMode::User);
        assert!(
            matches!(outcome, SwitchOutcome::Switched(u) if u.mode == SessionMode::User && u.is_admin)
        );
    }
}
