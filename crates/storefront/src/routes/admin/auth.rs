//! Back-office login and logout.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use bookstore_core::SessionMode;

use crate::error::Result;
use crate::middleware::{OptionalAuth, PageContext, flash_error, flash_info, flash_success};
use crate::routes::auth::{LoginForm, finish_session, start_session};
use crate::services::{AuthError, AuthService, LoginKind};
use crate::state::AppState;

/// Admin login page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/login.html")]
pub struct AdminLoginTemplate {
    pub ctx: PageContext,
}

/// Display the admin login page.
pub async fn login_page(session: Session) -> impl IntoResponse {
    AdminLoginTemplate {
        ctx: PageContext::load(&session).await,
    }
}

/// Handle admin login. Shopper accounts are refused here.
#[instrument(skip(state, session, form), fields(username = %form.username))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let result = AuthService::new(state.pool())
        .login(&form.username, &form.password, LoginKind::Admin)
        .await;

    match result {
        Ok(user) => {
            start_session(&session, &user, SessionMode::Admin).await?;
            flash_success(&session, "Admin login successful!").await;
            Ok(Redirect::to("/admin").into_response())
        }
        Err(AuthError::InvalidCredentials) => {
            tracing::warn!("Admin login failed");
            flash_error(&session, "Invalid admin credentials").await;
            Ok(Redirect::to("/admin/login").into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// Log out and return to the admin login page.
#[instrument(skip(session, user))]
pub async fn logout(session: Session, OptionalAuth(user): OptionalAuth) -> Result<Response> {
    if let Some(user) = user {
        finish_session(&session, &user).await?;
        flash_info(
            &session,
            format!("Admin {} has been logged out", user.username),
        )
        .await;
    }
    Ok(Redirect::to("/admin/login").into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_login_page_uses_shop_layout() {
        let html = AdminLoginTemplate {
            ctx: PageContext::default(),
        }
        .render()
        .unwrap();

        assert!(html.contains("action=\"/admin/login\""));
        assert!(html.contains("href=\"/register\""));
        assert!(!html.contains("admin-nav"));
    }
}
