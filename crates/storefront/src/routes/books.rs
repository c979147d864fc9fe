//! Book listing and detail route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use bookstore_core::BookId;

use crate::error::Result;
use crate::middleware::{PageContext, flash_error};
use crate::routes::views::{BookCard, BookView, cards};
use crate::services::CatalogService;
use crate::state::AppState;

/// Genre listing template.
#[derive(Template, WebTemplate)]
#[template(path = "books/genre.html")]
pub struct GenreTemplate {
    pub ctx: PageContext,
    pub genre: String,
    pub books: Vec<BookCard>,
}

/// Book detail template.
#[derive(Template, WebTemplate)]
#[template(path = "books/detail.html")]
pub struct BookDetailTemplate {
    pub ctx: PageContext,
    pub book: BookView,
    pub related: Vec<BookCard>,
}

/// Display the active books of one genre, by title.
#[instrument(skip(state, session))]
pub async fn genre(
    State(state): State<AppState>,
    session: Session,
    Path(genre): Path<String>,
) -> Result<impl IntoResponse> {
    let books = CatalogService::new(state.pool()).genre(&genre).await?;

    Ok(GenreTemplate {
        ctx: PageContext::load(&session).await,
        genre,
        books: cards(&books),
    })
}

/// Display a book with related titles from its genre.
///
/// Unknown or inactive books flash "Book not found" and go home.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<Response> {
    let Some(detail) = CatalogService::new(state.pool())
        .detail(BookId::new(id))
        .await?
    else {
        flash_error(&session, "Book not found").await;
        return Ok(Redirect::to("/").into_response());
    };

    Ok(BookDetailTemplate {
        ctx: PageContext::load(&session).await,
        book: BookView::from(&detail.book),
        related: cards(&detail.related),
    }
    .into_response())
}
