//! Back-office order list and status changes.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use bookstore_core::{OrderId, OrderStatus};

use crate::error::Result;
use crate::middleware::{PageContext, RequireAdmin, flash_error, flash_success};
use crate::routes::views::{OrderRowView, SelectOption, order_rows};
use crate::services::{OrderError, OrderService};
use crate::state::AppState;

/// Order list filter.
#[derive(Debug, Default, Deserialize)]
pub struct OrderFilter {
    pub status: Option<String>,
}

impl OrderFilter {
    /// The status to filter by; `all`, blank or unknown values list everything.
    fn status(&self) -> Option<OrderStatus> {
        self.status.as_deref().and_then(|s| s.parse().ok())
    }
}

/// Status update form data.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
}

/// Order list template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/orders.html")]
pub struct OrdersTemplate {
    pub ctx: PageContext,
    pub current_path: &'static str,
    pub filters: Vec<SelectOption>,
    pub orders: Vec<OrderRowView>,
}

fn filter_options(current: Option<OrderStatus>) -> Vec<SelectOption> {
    std::iter::once(SelectOption {
        value: "all",
        label: "All",
        selected: current.is_none(),
    })
    .chain(OrderStatus::ALL.into_iter().map(|s| SelectOption {
        value: s.as_str(),
        label: match s {
            OrderStatus::Pending => "Pending",
            OrderStatus::Completed => "Completed",
        },
        selected: current == Some(s),
    }))
    .collect()
}

/// Orders, newest first, optionally filtered by status.
#[instrument(skip(state, session, _admin))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(_admin): RequireAdmin,
    Query(filter): Query<OrderFilter>,
) -> Result<impl IntoResponse> {
    let status = filter.status();
    let orders = OrderService::new(state.pool()).list(status).await?;

    Ok(OrdersTemplate {
        ctx: PageContext::load(&session).await,
        current_path: "/admin/orders",
        filters: filter_options(status),
        orders: order_rows(&orders),
    })
}

/// Change an order's status. Only `pending -> completed` is allowed.
#[instrument(skip(state, session, admin, form), fields(admin_id = %admin.id))]
pub async fn update_status(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<i32>,
    Form(form): Form<StatusForm>,
) -> Result<Response> {
    let Ok(next) = form.status.parse::<OrderStatus>() else {
        flash_error(&session, "Invalid order status").await;
        return Ok(Redirect::to("/admin/orders").into_response());
    };

    match OrderService::new(state.pool())
        .update_status(OrderId::new(id), next)
        .await
    {
        Ok(()) => flash_success(&session, "Order status updated successfully").await,
        Err(e @ (OrderError::NotFound | OrderError::InvalidTransition { .. })) => {
            tracing::warn!(error = %e, "Order status change rejected");
            flash_error(&session, e.to_string()).await;
        }
        Err(e) => return Err(e.into()),
    }
    Ok(Redirect::to("/admin/orders").into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_parsing() {
        let filter = |s: Option<&str>| OrderFilter {
            status: s.map(String::from),
        };
        assert_eq!(filter(None).status(), None);
        assert_eq!(filter(Some("all")).status(), None);
        assert_eq!(filter(Some("bogus")).status(), None);
        assert_eq!(
            filter(Some("completed")).status(),
            Some(OrderStatus::Completed)
        );
    }

    #[test]
    fn test_filter_options_mark_current() {
        let options = filter_options(Some(OrderStatus::Pending));
        let selected: Vec<_> = options.iter().filter(|o| o.selected).map(|o| o.value).collect();
        assert_eq!(selected, vec!["pending"]);
        assert!(filter_options(None).first().is_some_and(|o| o.selected));
    }
}
