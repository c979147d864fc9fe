//! Catalogue reads for the public pages.

use sqlx::PgPool;

use bookstore_core::BookId;

use crate::db::{BookRepository, RepositoryError};
use crate::models::Book;

const FEATURED_LIMIT: i64 = 8;
const PER_GENRE_LIMIT: i64 = 6;
const RELATED_LIMIT: i64 = 4;

/// Newest books of one genre for the home page.
#[derive(Debug, Clone)]
pub struct GenreShelf {
    pub genre: String,
    pub books: Vec<Book>,
}

/// Everything the home page shows.
#[derive(Debug, Clone)]
pub struct HomePage {
    pub featured: Vec<Book>,
    pub shelves: Vec<GenreShelf>,
}

/// A book with others from its genre.
#[derive(Debug, Clone)]
pub struct BookDetail {
    pub book: Book,
    pub related: Vec<Book>,
}

/// Group books that arrive sorted by genre into shelves, keeping order.
fn group_by_genre(books: Vec<Book>) -> Vec<GenreShelf> {
    let mut shelves: Vec<GenreShelf> = Vec::new();
    for book in books {
        match shelves.last_mut() {
            Some(shelf) if shelf.genre == book.genre => shelf.books.push(book),
            _ => shelves.push(GenreShelf {
                genre: book.genre.clone(),
                books: vec![book],
            }),
        }
    }
    shelves
}

/// Catalogue service.
pub struct CatalogService<'a> {
    books: BookRepository<'a>,
}

impl<'a> CatalogService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            books: BookRepository::new(pool),
        }
    }

    /// Featured books plus a shelf per genre, genres alphabetical.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if a query fails.
    pub async fn home(&self) -> Result<HomePage, RepositoryError> {
        let featured = self.books.featured(FEATURED_LIMIT).await?;
        let shelves = group_by_genre(self.books.newest_per_genre(PER_GENRE_LIMIT).await?);
        Ok(HomePage { featured, shelves })
    }

    /// Active books in a genre, by title.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    pub async fn genre(&self, genre: &str) -> Result<Vec<Book>, RepositoryError> {
        self.books.by_genre(genre).await
    }

    /// Genres with at least one active book.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    pub async fn genres(&self) -> Result<Vec<String>, RepositoryError> {
        self.books.genres().await
    }

    /// An active book and up to four related titles; `None` if the book is
    /// unknown or inactive.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if a query fails.
    pub async fn detail(&self, id: BookId) -> Result<Option<BookDetail>, RepositoryError> {
        let Some(book) = self.books.get_by_id(id).await?.filter(|b| b.is_active) else {
            return Ok(None);
        };
        let related = self.books.related(&book, RELATED_LIMIT).await?;
        Ok(Some(BookDetail { book, related }))
    }

    /// Substring search over title, author and genre.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    pub async fn search(&self, query: &str) -> Result<Vec<Book>, RepositoryError> {
        self.books.search(query).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::Utc;

    use bookstore_core::Price;

    use super::*;

    fn book(id: i32, genre: &str) -> Book {
        Book {
            id: BookId::new(id),
            title: format!("Book {id}"),
            author: "Author".to_string(),
            description: None,
            price: Price::parse("9.99").unwrap(),
            genre: genre.to_string(),
            stock: 1,
            cover_image: None,
            isbn: None,
            publisher: None,
            pages: 100,
            is_featured: false,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_group_by_genre_keeps_order() {
        let shelves = group_by_genre(vec![
            book(1, "Fantasy"),
            book(2, "Fantasy"),
            book(3, "Mystery"),
        ]);
        assert_eq!(shelves.len(), 2);
        assert_eq!(shelves[0].genre, "Fantasy");
        assert_eq!(shelves[0].books.len(), 2);
        assert_eq!(shelves[1].books[0].id, BookId::new(3));
    }

    #[test]
    fn test_group_by_genre_empty() {
        assert!(group_by_genre(Vec::new()).is_empty());
    }
}
