//! Back-office user list.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tower_sessions::Session;
use tracing::instrument;

use crate::db::UserRepository;
use crate::error::Result;
use crate::middleware::{PageContext, RequireAdmin};
use crate::models::User;
use crate::routes::views::format_date;
use crate::state::AppState;

/// User row for templates.
#[derive(Debug, Clone)]
pub struct UserListItem {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub role: &'static str,
    pub created_at: String,
}

impl From<&User> for UserListItem {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.as_i32(),
            username: user.username.to_string(),
            email: user.email.to_string(),
            role: if user.is_admin { "Admin" } else { "Customer" },
            created_at: format_date(user.created_at),
        }
    }
}

/// User list template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/users.html")]
pub struct UsersTemplate {
    pub ctx: PageContext,
    pub current_path: &'static str,
    pub users: Vec<UserListItem>,
}

/// Every account, newest first.
#[instrument(skip(state, session, _admin))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<impl IntoResponse> {
    let users = UserRepository::new(state.pool()).list().await?;

    Ok(UsersTemplate {
        ctx: PageContext::load(&session).await,
        current_path: "/admin/users",
        users: users.iter().map(UserListItem::from).collect(),
    })
}
