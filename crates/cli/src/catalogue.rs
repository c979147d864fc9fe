//! The bundled sample catalogue (`data/catalogue.yaml`).

use std::collections::HashSet;

use serde::Deserialize;
use thiserror::Error;

use bookstore_core::Price;
use bookstore_storefront::db::BookInput;

const CATALOGUE_YAML: &str = include_str!("../data/catalogue.yaml");

/// Problems with the bundled catalogue file.
#[derive(Debug, Error)]
pub enum CatalogueError {
    #[error("catalogue is not valid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid entry \"{title}\": {reason}")]
    InvalidEntry { title: String, reason: String },

    #[error("cover file name used twice: {0}")]
    DuplicateCover(String),
}

#[derive(Debug, Deserialize)]
struct CatalogueFile {
    books: Vec<CatalogueBook>,
}

/// One book as written in the YAML file.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogueBook {
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: String,
    pub genre: String,
    pub stock: i32,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub pages: i32,
    #[serde(default)]
    pub featured: bool,
}

impl CatalogueBook {
    /// Convert into repository input. Seeded books are always active.
    ///
    /// # Errors
    ///
    /// Returns `CatalogueError::InvalidEntry` for a bad price or a negative count.
    pub fn to_input(&self) -> Result<BookInput, CatalogueError> {
        let invalid = |reason: String| CatalogueError::InvalidEntry {
            title: self.title.clone(),
            reason,
        };

        let price = Price::parse(&self.price).map_err(|e| invalid(e.to_string()))?;
        if self.stock < 0 || self.pages < 0 {
            return Err(invalid("stock and pages must not be negative".to_string()));
        }

        Ok(BookInput {
            title: self.title.clone(),
            author: self.author.clone(),
            description: self.description.clone(),
            price,
            genre: self.genre.clone(),
            stock: self.stock,
            cover_image: self.cover_image.clone(),
            isbn: self.isbn.clone(),
            publisher: self.publisher.clone(),
            pages: self.pages,
            is_featured: self.featured,
            is_active: true,
        })
    }
}

/// Load and check the bundled catalogue.
///
/// # Errors
///
/// Returns `CatalogueError` if the file doesn't parse or two books share a
/// cover file name.
pub fn load() -> Result<Vec<CatalogueBook>, CatalogueError> {
    let file: CatalogueFile = serde_yaml::from_str(CATALOGUE_YAML)?;

    let mut covers = HashSet::new();
    for cover in file.books.iter().filter_map(|b| b.cover_image.as_deref()) {
        if !covers.insert(cover) {
            return Err(CatalogueError::DuplicateCover(cover.to_string()));
        }
    }

    Ok(file.books)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_catalogue_loads() {
        let books = load().unwrap();
        assert_eq!(books.len(), 100);

        let genres: HashSet<_> = books.iter().map(|b| b.genre.as_str()).collect();
        assert_eq!(genres.len(), 10);
    }

    #[test]
    fn test_every_entry_converts() {
        for book in load().unwrap() {
            let input = book.to_input().unwrap();
            assert!(input.is_active);
            assert!(input.cover_image.is_some(), "{} has no cover", book.title);
        }
    }

    #[test]
    fn test_bad_price_is_reported_with_title() {
        let book = CatalogueBook {
            title: "Broken".to_string(),
            author: "Nobody".to_string(),
            description: None,
            price: "free".to_string(),
            genre: "Fiction".to_string(),
            stock: 1,
            cover_image: None,
            isbn: None,
            publisher: None,
            pages: 0,
            featured: false,
        };
        let err = book.to_input().unwrap_err();
        assert!(err.to_string().contains("Broken"));
    }
}
