//! Back-office dashboard.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tower_sessions::Session;
use tracing::instrument;

use crate::db::BookRepository;
use crate::error::Result;
use crate::middleware::{PageContext, RequireAdmin};
use crate::routes::views::{OrderRowView, order_rows};
use crate::services::OrderService;
use crate::state::AppState;

const RECENT_ORDERS: i64 = 5;
const LOW_STOCK_THRESHOLD: i32 = 10;
const LOW_STOCK_LIMIT: i64 = 5;

/// A book running out of stock.
pub struct LowStockView {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub stock: i32,
}

/// Dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/dashboard.html")]
pub struct DashboardTemplate {
    pub ctx: PageContext,
    pub current_path: &'static str,
    pub total_users: i64,
    pub total_books: i64,
    pub total_orders: i64,
    pub total_revenue: String,
    pub pending_orders: i64,
    pub recent_orders: Vec<OrderRowView>,
    pub low_stock: Vec<LowStockView>,
}

/// Display counters, recent orders and low-stock books.
#[instrument(skip(state, session, _admin))]
pub async fn dashboard(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<impl IntoResponse> {
    let orders = OrderService::new(state.pool());
    let stats = orders.dashboard_stats().await?;
    let recent = orders.recent(RECENT_ORDERS).await?;
    let low_stock = BookRepository::new(state.pool())
        .low_stock(LOW_STOCK_THRESHOLD, LOW_STOCK_LIMIT)
        .await?;

    Ok(DashboardTemplate {
        ctx: PageContext::load(&session).await,
        current_path: "/admin",
        total_users: stats.total_users,
        total_books: stats.total_books,
        total_orders: stats.total_orders,
        total_revenue: stats.total_revenue.to_string(),
        pending_orders: stats.pending_orders,
        recent_orders: order_rows(&recent),
        low_stock: low_stock
            .iter()
            .map(|b| LowStockView {
                id: b.id.as_i32(),
                title: b.title.clone(),
                author: b.author.clone(),
                stock: b.stock,
            })
            .collect(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_dashboard_renders_in_admin_layout() {
        let html = DashboardTemplate {
            ctx: PageContext::default(),
            current_path: "/admin",
            total_users: 3,
            total_books: 100,
            total_orders: 7,
            total_revenue: "$41.97".to_string(),
            pending_orders: 2,
            recent_orders: Vec::new(),
            low_stock: vec![LowStockView {
                id: 9,
                title: "Emma".to_string(),
                author: "Jane Austen".to_string(),
                stock: 2,
            }],
        }
        .render()
        .unwrap();

        assert!(html.contains("<a href=\"/admin\" class=\"active\">Dashboard</a>"));
        assert!(html.contains("$41.97"));
        assert!(html.contains("/admin/books/9/edit"));
        assert!(html.contains("No orders yet."));
    }
}
