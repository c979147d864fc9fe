//! Back-office book management: list, add and edit.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use bookstore_core::{BookId, Price};

use crate::db::{BookInput, BookRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::middleware::{PageContext, RequireAdmin, flash_success};
use crate::models::{Book, Flash, FlashLevel};
use crate::routes::views::format_date;
use crate::state::AppState;

// =============================================================================
// Form
// =============================================================================

/// Add/edit book form data. Everything arrives as text.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub genre: String,
    #[serde(default)]
    pub stock: String,
    #[serde(default)]
    pub cover_image: String,
    #[serde(default)]
    pub isbn: String,
    #[serde(default)]
    pub publisher: String,
    #[serde(default)]
    pub pages: String,
    /// Checkbox: present when ticked.
    pub is_featured: Option<String>,
    /// Checkbox: present when ticked.
    pub is_active: Option<String>,
}

fn non_blank(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

impl BookForm {
    /// Validate into repository input, or a message for the admin.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first invalid field.
    pub fn validate(&self) -> std::result::Result<BookInput, String> {
        let (Some(title), Some(author), Some(genre)) = (
            non_blank(&self.title),
            non_blank(&self.author),
            non_blank(&self.genre),
        ) else {
            return Err("Title, author and genre are required".to_string());
        };

        let price = Price::parse(&self.price).map_err(|e| format!("Invalid price: {e}"))?;

        let stock = self
            .stock
            .trim()
            .parse::<i32>()
            .ok()
            .filter(|s| *s >= 0)
            .ok_or_else(|| "Stock must be a whole number of at least 0".to_string())?;

        let pages = match self.pages.trim() {
            "" => 0,
            raw => raw
                .parse::<i32>()
                .ok()
                .filter(|p| *p >= 0)
                .ok_or_else(|| "Pages must be a whole number of at least 0".to_string())?,
        };

        Ok(BookInput {
            title,
            author,
            description: non_blank(&self.description),
            price,
            genre,
            stock,
            cover_image: non_blank(&self.cover_image),
            isbn: non_blank(&self.isbn),
            publisher: non_blank(&self.publisher),
            pages,
            is_featured: self.is_featured.is_some(),
            is_active: self.is_active.is_some(),
        })
    }
}

impl From<&Book> for BookForm {
    fn from(book: &Book) -> Self {
        let checked = |b: bool| b.then(|| "on".to_string());
        Self {
            title: book.title.clone(),
            author: book.author.clone(),
            description: book.description.clone().unwrap_or_default(),
            price: book.price.amount().to_string(),
            genre: book.genre.clone(),
            stock: book.stock.to_string(),
            cover_image: book.cover_image.clone().unwrap_or_default(),
            isbn: book.isbn.clone().unwrap_or_default(),
            publisher: book.publisher.clone().unwrap_or_default(),
            pages: book.pages.to_string(),
            is_featured: checked(book.is_featured),
            is_active: checked(book.is_active),
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Book row for the list.
pub struct BookListItem {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub price: String,
    pub stock: i32,
    pub is_featured: bool,
    pub is_active: bool,
    pub created_at: String,
}

impl From<&Book> for BookListItem {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id.as_i32(),
            title: book.title.clone(),
            author: book.author.clone(),
            genre: book.genre.clone(),
            price: book.price.to_string(),
            stock: book.stock,
            is_featured: book.is_featured,
            is_active: book.is_active,
            created_at: format_date(book.created_at),
        }
    }
}

/// Book list template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/books.html")]
pub struct BooksTemplate {
    pub ctx: PageContext,
    pub current_path: &'static str,
    pub books: Vec<BookListItem>,
}

/// Add/edit form template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/book_form.html")]
pub struct BookFormTemplate {
    pub ctx: PageContext,
    pub current_path: &'static str,
    pub heading: &'static str,
    pub action: String,
    pub form: BookForm,
}

impl BookFormTemplate {
    fn new_book(ctx: PageContext, form: BookForm) -> Self {
        Self {
            ctx,
            current_path: "/admin/books",
            heading: "Add Book",
            action: "/admin/books/new".to_string(),
            form,
        }
    }

    fn edit_book(ctx: PageContext, id: i32, form: BookForm) -> Self {
        Self {
            ctx,
            current_path: "/admin/books",
            heading: "Edit Book",
            action: format!("/admin/books/{id}/edit"),
            form,
        }
    }
}

/// Re-render the form with the submitted values and an error.
async fn rejected(session: &Session, message: String) -> PageContext {
    let mut ctx = PageContext::load(session).await;
    ctx.flashes.push(Flash {
        level: FlashLevel::Error,
        message,
    });
    ctx
}

// =============================================================================
// Handlers
// =============================================================================

/// Every book, newest first, including inactive ones.
#[instrument(skip(state, session, _admin))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<impl IntoResponse> {
    let books = BookRepository::new(state.pool()).list_all().await?;

    Ok(BooksTemplate {
        ctx: PageContext::load(&session).await,
        current_path: "/admin/books",
        books: books.iter().map(BookListItem::from).collect(),
    })
}

/// Empty add form. New books default to active.
pub async fn new_page(session: Session, RequireAdmin(_admin): RequireAdmin) -> impl IntoResponse {
    let form = BookForm {
        is_active: Some("on".to_string()),
        ..BookForm::default()
    };
    BookFormTemplate::new_book(PageContext::load(&session).await, form)
}

/// Create a book.
#[instrument(skip(state, session, admin, form), fields(admin_id = %admin.id))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Form(form): Form<BookForm>,
) -> Result<Response> {
    let input = match form.validate() {
        Ok(input) => input,
        Err(message) => {
            let ctx = rejected(&session, message).await;
            return Ok(BookFormTemplate::new_book(ctx, form).into_response());
        }
    };

    let book = BookRepository::new(state.pool()).create(&input).await?;
    tracing::info!(book_id = %book.id, "Book added");
    flash_success(&session, "Book added successfully").await;
    Ok(Redirect::to("/admin/books").into_response())
}

/// Edit form prefilled with the book.
#[instrument(skip(state, session, _admin))]
pub async fn edit_page(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    let book = BookRepository::new(state.pool())
        .get_by_id(BookId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("book {id}")))?;

    Ok(BookFormTemplate::edit_book(
        PageContext::load(&session).await,
        id,
        BookForm::from(&book),
    ))
}

/// Save an edited book.
#[instrument(skip(state, session, admin, form), fields(admin_id = %admin.id))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<i32>,
    Form(form): Form<BookForm>,
) -> Result<Response> {
    let input = match form.validate() {
        Ok(input) => input,
        Err(message) => {
            let ctx = rejected(&session, message).await;
            return Ok(BookFormTemplate::edit_book(ctx, id, form).into_response());
        }
    };

    BookRepository::new(state.pool())
        .update(BookId::new(id), &input)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound(format!("book {id}")),
            other => other.into(),
        })?;

    tracing::info!(book_id = id, "Book updated");
    flash_success(&session, "Book updated successfully").await;
    Ok(Redirect::to("/admin/books").into_response())
}
