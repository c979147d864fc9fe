//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::middleware::PageContext;
use crate::routes::views::{BookCard, cards};
use crate::services::CatalogService;
use crate::state::AppState;

/// One genre row on the home page.
pub struct ShelfView {
    pub genre: String,
    pub books: Vec<BookCard>,
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct HomeTemplate {
    pub ctx: PageContext,
    pub featured: Vec<BookCard>,
    pub shelves: Vec<ShelfView>,
}

/// Display the home page: featured books and the newest titles per genre.
#[instrument(skip(state, session))]
pub async fn home(State(state): State<AppState>, session: Session) -> Result<impl IntoResponse> {
    let page = CatalogService::new(state.pool()).home().await?;

    Ok(HomeTemplate {
        ctx: PageContext::load(&session).await,
        featured: cards(&page.featured),
        shelves: page
            .shelves
            .iter()
            .map(|shelf| ShelfView {
                genre: shelf.genre.clone(),
                books: cards(&shelf.books),
            })
            .collect(),
    })
}
