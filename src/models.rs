//! Normalized entities and the page wrappers operations return. Optional
//! presentation fields are plain strings defaulting to empty, never `null`,
//! so downstream rendering code stays total.

use serde::{Deserialize, Serialize};

use crate::extract::ExtractReport;
use crate::pagination::PageToken;

/// A novel as listed or detailed on a source site.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub title: String,
    /// Absolute URL on the source site. Never empty for parsed entries; it
    /// is the entity's surrogate key.
    pub link: String,
    #[serde(default)]
    pub cover: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub source_id: i64,
}

/// One chapter entry of a book.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    pub title: String,
    /// Absolute URL of the reader page; never empty for parsed entries.
    pub link: String,
    /// 1-based position in ascending reading order within the fetched slice.
    #[serde(default)]
    pub index: u32,
}

/// Search refinements passed to `get_search`.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Title(String),
}

/// One page of listing results.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BooksPage {
    pub books: Vec<Book>,
    pub has_next: bool,
    pub report: ExtractReport,
}

/// A parsed detail page.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BookPage {
    pub book: Book,
    pub report: ExtractReport,
}

/// One slice of a book's chapter list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChaptersPage {
    pub chapters: Vec<Chapter>,
    pub has_next: bool,
    /// Continuation for the next call when the site paginates its chapter
    /// list through in-page links.
    pub next_token: Option<PageToken>,
    pub report: ExtractReport,
}

/// A chapter body: ordered paragraphs, with a configured page title first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContentPage {
    pub paragraphs: Vec<String>,
    pub report: ExtractReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn book_defaults_are_empty_strings_not_null() {
        let book = Book {
            title: "T".to_string(),
            link: "https://example.com/t".to_string(),
            ..Book::default()
        };
        assert_eq!(book.cover, "");
        assert_eq!(book.author, "");
        assert_eq!(book.description, "");
        assert!(book.genres.is_empty());
    }

    #[test]
    fn book_deserializes_with_missing_optionals() {
        let book: Book =
            serde_json::from_str(r#"{"title":"T","link":"https://example.com/t"}"#).unwrap();
        assert_eq!(book.author, "");
        assert_eq!(book.source_id, 0);
    }
}
