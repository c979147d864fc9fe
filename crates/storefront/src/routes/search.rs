//! Search route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::middleware::PageContext;
use crate::routes::views::{BookCard, cards};
use crate::services::CatalogService;
use crate::state::AppState;

/// Search query parameters.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// Search results template.
#[derive(Template, WebTemplate)]
#[template(path = "search.html")]
pub struct SearchTemplate {
    pub ctx: PageContext,
    pub query: String,
    pub books: Vec<BookCard>,
}

/// Search titles, authors and genres. An empty query lists every active book.
#[instrument(skip(state, session))]
pub async fn search(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<SearchQuery>,
) -> Result<impl IntoResponse> {
    let query = params.q.trim().to_string();
    let books = CatalogService::new(state.pool()).search(&query).await?;

    tracing::debug!(results = books.len(), "Search complete");

    Ok(SearchTemplate {
        ctx: PageContext::load(&session).await,
        query,
        books: cards(&books),
    })
}
