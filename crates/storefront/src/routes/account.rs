//! Account page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::middleware::{PageContext, RequireShopper};
use crate::routes::views::{OrderRowView, format_date, order_rows};
use crate::services::OrderService;
use crate::state::AppState;

/// Profile page template.
#[derive(Template, WebTemplate)]
#[template(path = "account.html")]
pub struct AccountTemplate {
    pub ctx: PageContext,
    pub username: String,
    pub logged_in_since: String,
    pub orders: Vec<OrderRowView>,
}

/// Display the shopper's profile and order history, newest first.
#[instrument(skip(state, session, user))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireShopper(user): RequireShopper,
) -> Result<impl IntoResponse> {
    let orders = OrderService::new(state.pool()).history(user.id).await?;

    Ok(AccountTemplate {
        ctx: PageContext::load(&session).await,
        username: user.username,
        logged_in_since: format_date(user.login_time),
        orders: order_rows(&orders),
    })
}
