//! Placeholder cover images for the sample catalogue.
//!
//! Writes one 300x400 SVG per cover file name in the catalogue, filled with
//! the genre's colour and carrying the title, plus `default.svg` for books
//! without a cover.

use std::path::Path;

use askama::Template;

use super::CommandError;
use crate::catalogue;

const DEFAULT_COLOR: &str = "#95a5a6";
const WRAP_AT: usize = 20;
const FIRST_BASELINE: u32 = 170;
const LINE_HEIGHT: u32 = 26;

/// Fill colour per genre. Unknown genres fall back to the Fiction blue.
fn genre_color(genre: &str) -> &'static str {
    match genre {
        "Mystery" => "#e74c3c",
        "Science Fiction" => "#9b59b6",
        "Fantasy" => "#f39c12",
        "Romance" => "#e91e63",
        "Thriller" => "#34495e",
        "Biography" => "#16a085",
        "History" => "#795548",
        "Science" => "#27ae60",
        "Children" => "#f1c40f",
        _ => "#3498db",
    }
}

/// Break a title into lines of at most `width` characters on word boundaries.
/// A single word longer than `width` gets a line of its own.
fn wrap(title: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in title.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

struct TextLine {
    y: u32,
    text: String,
}

#[derive(Template)]
#[template(path = "cover.svg", escape = "html")]
struct CoverSvg<'a> {
    color: &'a str,
    genre: Option<&'a str>,
    font_size: u32,
    lines: Vec<TextLine>,
}

impl<'a> CoverSvg<'a> {
    fn new(color: &'a str, genre: Option<&'a str>, font_size: u32, lines: Vec<String>) -> Self {
        let lines = (0..)
            .zip(lines)
            .map(|(i, text)| TextLine {
                y: FIRST_BASELINE + i * LINE_HEIGHT,
                text,
            })
            .collect();
        Self {
            color,
            genre,
            font_size,
            lines,
        }
    }

    fn book(title: &'a str, genre: &'a str) -> Self {
        Self::new(genre_color(genre), Some(genre), 20, wrap(title, WRAP_AT))
    }

    fn placeholder() -> Self {
        Self::new(
            DEFAULT_COLOR,
            None,
            24,
            vec!["No Cover".to_string(), "Available".to_string()],
        )
    }
}

/// Write every cover into `out`, creating the directory if needed.
pub async fn run(out: &Path) -> Result<(), CommandError> {
    let books = catalogue::load()?;
    tokio::fs::create_dir_all(out).await?;

    let mut written = 0_usize;
    for book in &books {
        let Some(file_name) = book.cover_image.as_deref() else {
            continue;
        };
        let svg = CoverSvg::book(&book.title, &book.genre).render()?;
        tokio::fs::write(out.join(file_name), svg).await?;
        tracing::debug!(file_name, "Cover written");
        written += 1;
    }

    tokio::fs::write(out.join("default.svg"), CoverSvg::placeholder().render()?).await?;

    tracing::info!(
        "Created {} placeholder covers in {}",
        written + 1,
        out.display()
    );
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_breaks_on_words() {
        assert_eq!(
            wrap("The Hitchhiker's Guide to the Galaxy", 20),
            vec!["The Hitchhiker's", "Guide to the Galaxy"]
        );
        assert_eq!(wrap("Dune", 20), vec!["Dune"]);
        assert!(wrap("   ", 20).is_empty());
    }

    #[test]
    fn test_wrap_keeps_long_word_whole() {
        assert_eq!(
            wrap("Supercalifragilisticexpialidocious book", 20),
            vec!["Supercalifragilisticexpialidocious", "book"]
        );
    }

    #[test]
    fn test_genre_colors() {
        assert_eq!(genre_color("Mystery"), "#e74c3c");
        assert_eq!(genre_color("Fiction"), "#3498db");
        assert_eq!(genre_color("Cookbooks"), "#3498db");
    }

    #[test]
    fn test_cover_escapes_title() {
        let svg = CoverSvg::book("Dungeons & <Dragons>", "Fantasy")
            .render()
            .unwrap();
        assert!(svg.contains("Dungeons &#38; &#60;Dragons&#62;"));
        assert!(!svg.contains("& <"));
        assert!(!svg.contains("<Dragons>"));
        assert!(svg.contains("#f39c12"));
        assert!(svg.contains(">Fantasy<"));
    }

    #[test]
    fn test_lines_step_down() {
        let svg = CoverSvg::book("One Hundred Years of Solitude", "Fiction")
            .render()
            .unwrap();
        assert!(svg.contains("y=\"170\""));
        assert!(svg.contains("y=\"196\""));
    }

    #[test]
    fn test_placeholder() {
        let svg = CoverSvg::placeholder().render().unwrap();
        assert!(svg.contains("No Cover"));
        assert!(svg.contains("Available"));
        assert!(svg.contains(DEFAULT_COLOR));
    }
}
