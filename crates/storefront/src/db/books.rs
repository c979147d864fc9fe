//! Book repository: catalogue reads for the shop and writes for the back-office.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use bookstore_core::{BookId, Price};

use super::RepositoryError;
use crate::models::Book;

/// Column list shared by every book query.
const BOOK_COLUMNS: &str = "id, title, author, description, price, genre, stock, cover_image, \
     isbn, publisher, pages, is_featured, is_active, created_at";

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct BookRow {
    id: BookId,
    title: String,
    author: String,
    description: Option<String>,
    price: Price,
    genre: String,
    stock: i32,
    cover_image: Option<String>,
    isbn: Option<String>,
    publisher: Option<String>,
    pages: i32,
    is_featured: bool,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<BookRow> for Book {
    type Error = RepositoryError;

    fn try_from(row: BookRow) -> Result<Self, Self::Error> {
        if row.stock < 0 {
            return Err(RepositoryError::DataCorruption(format!(
                "book {} has negative stock {}",
                row.id, row.stock
            )));
        }

        Ok(Self {
            id: row.id,
            title: row.title,
            author: row.author,
            description: row.description,
            price: row.price,
            genre: row.genre,
            stock: row.stock,
            cover_image: row.cover_image,
            isbn: row.isbn,
            publisher: row.publisher,
            pages: row.pages,
            is_featured: row.is_featured,
            is_active: row.is_active,
            created_at: row.created_at,
        })
    }
}

fn into_books(rows: Vec<BookRow>) -> Result<Vec<Book>, RepositoryError> {
    rows.into_iter().map(Book::try_from).collect()
}

/// Escape `%`, `_` and `\` so user input matches literally inside `LIKE`.
fn like_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Validated fields for creating or editing a book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookInput {
    pub title: String,
    pub author: String,
    pub description: Option<String>,
    pub price: Price,
    pub genre: String,
    pub stock: i32,
    pub cover_image: Option<String>,
    pub isbn: Option<String>,
    pub publisher: Option<String>,
    pub pages: i32,
    pub is_featured: bool,
    pub is_active: bool,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for book database operations.
pub struct BookRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> BookRepository<'a> {
    /// Create a new book repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a book by ID, active or not.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: BookId) -> Result<Option<Book>, RepositoryError> {
        let row = sqlx::query_as::<_, BookRow>(&format!(
            "SELECT {BOOK_COLUMNS} FROM bookstore.books WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Book::try_from).transpose()
    }

    /// Newest featured active books.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn featured(&self, limit: i64) -> Result<Vec<Book>, RepositoryError> {
        let rows = sqlx::query_as::<_, BookRow>(&format!(
            "SELECT {BOOK_COLUMNS} FROM bookstore.books
             WHERE is_featured AND is_active
             ORDER BY created_at DESC, id DESC
             LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        into_books(rows)
    }

    /// The `per_genre` newest active books of every genre, ordered by genre
    /// name and then newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn newest_per_genre(&self, per_genre: i64) -> Result<Vec<Book>, RepositoryError> {
        let rows = sqlx::query_as::<_, BookRow>(&format!(
            "SELECT {BOOK_COLUMNS} FROM (
                 SELECT *, ROW_NUMBER() OVER (
                     PARTITION BY genre ORDER BY created_at DESC, id DESC
                 ) AS genre_rank
                 FROM bookstore.books
                 WHERE is_active
             ) ranked
             WHERE genre_rank <= $1
             ORDER BY genre, created_at DESC, id DESC"
        ))
        .bind(per_genre)
        .fetch_all(self.pool)
        .await?;

        into_books(rows)
    }

    /// Distinct genres that have at least one active book, alphabetical.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn genres(&self) -> Result<Vec<String>, RepositoryError> {
        let genres = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT genre FROM bookstore.books WHERE is_active ORDER BY genre",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(genres)
    }

    /// Active books of a genre, by title.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn by_genre(&self, genre: &str) -> Result<Vec<Book>, RepositoryError> {
        let rows = sqlx::query_as::<_, BookRow>(&format!(
            "SELECT {BOOK_COLUMNS} FROM bookstore.books
             WHERE genre = $1 AND is_active
             ORDER BY title, id"
        ))
        .bind(genre)
        .fetch_all(self.pool)
        .await?;

        into_books(rows)
    }

    /// Other active books in the same genre.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn related(&self, book: &Book, limit: i64) -> Result<Vec<Book>, RepositoryError> {
        let rows = sqlx::query_as::<_, BookRow>(&format!(
            "SELECT {BOOK_COLUMNS} FROM bookstore.books
             WHERE genre = $1 AND id <> $2 AND is_active
             ORDER BY created_at DESC, id DESC
             LIMIT $3"
        ))
        .bind(&book.genre)
        .bind(book.id)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        into_books(rows)
    }

    /// Case-insensitive substring search over title, author and genre.
    ///
    /// An empty query matches every active book.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search(&self, query: &str) -> Result<Vec<Book>, RepositoryError> {
        let pattern = like_pattern(query.trim());
        let rows = sqlx::query_as::<_, BookRow>(&format!(
            "SELECT {BOOK_COLUMNS} FROM bookstore.books
             WHERE is_active
               AND (title ILIKE $1 OR author ILIKE $1 OR genre ILIKE $1)
             ORDER BY title, id"
        ))
        .bind(pattern)
        .fetch_all(self.pool)
        .await?;

        into_books(rows)
    }

    /// Every book, newest first (back-office listing).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Book>, RepositoryError> {
        let rows = sqlx::query_as::<_, BookRow>(&format!(
            "SELECT {BOOK_COLUMNS} FROM bookstore.books ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        into_books(rows)
    }

    /// Active books with fewer than `threshold` copies, lowest stock first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn low_stock(&self, threshold: i32, limit: i64) -> Result<Vec<Book>, RepositoryError> {
        let rows = sqlx::query_as::<_, BookRow>(&format!(
            "SELECT {BOOK_COLUMNS} FROM bookstore.books
             WHERE stock < $1 AND is_active
             ORDER BY stock, id
             LIMIT $2"
        ))
        .bind(threshold)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        into_books(rows)
    }

    /// Insert a book.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, input: &BookInput) -> Result<Book, RepositoryError> {
        let row = sqlx::query_as::<_, BookRow>(&format!(
            "INSERT INTO bookstore.books
                 (title, author, description, price, genre, stock, cover_image,
                  isbn, publisher, pages, is_featured, is_active)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             RETURNING {BOOK_COLUMNS}"
        ))
        .bind(&input.title)
        .bind(&input.author)
        .bind(&input.description)
        .bind(input.price)
        .bind(&input.genre)
        .bind(input.stock)
        .bind(&input.cover_image)
        .bind(&input.isbn)
        .bind(&input.publisher)
        .bind(input.pages)
        .bind(input.is_featured)
        .bind(input.is_active)
        .fetch_one(self.pool)
        .await?;

        Book::try_from(row)
    }

    /// Overwrite every editable field of a book.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the book doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(&self, id: BookId, input: &BookInput) -> Result<Book, RepositoryError> {
        let row = sqlx::query_as::<_, BookRow>(&format!(
            "UPDATE bookstore.books SET
                 title = $2, author = $3, description = $4, price = $5, genre = $6,
                 stock = $7, cover_image = $8, isbn = $9, publisher = $10, pages = $11,
                 is_featured = $12, is_active = $13
             WHERE id = $1
             RETURNING {BOOK_COLUMNS}"
        ))
        .bind(id)
        .bind(&input.title)
        .bind(&input.author)
        .bind(&input.description)
        .bind(input.price)
        .bind(&input.genre)
        .bind(input.stock)
        .bind(&input.cover_image)
        .bind(&input.isbn)
        .bind(&input.publisher)
        .bind(input.pages)
        .bind(input.is_featured)
        .bind(input.is_active)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Book::try_from(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_wraps_query() {
        assert_eq!(like_pattern("dune"), "%dune%");
        assert_eq!(like_pattern(""), "%%");
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
        assert_eq!(like_pattern("c:\\"), "%c:\\\\%");
    }
}
