//! Book - a catalog entry with copy accounting.

use crate::Isbn;
use garde::Validate;
use serde::{Deserialize, Serialize};

/// Table holding books, keyed by ISBN.
pub const TABLE: &str = "books";

/// A catalog entry and its copy counts.
///
/// `available_copies` moves only through the circulation module: down one on
/// check-out, up one on return. It never exceeds `total_copies`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Catalog key
    pub isbn: Isbn,
    pub title: String,
    pub author: String,
    pub category: Option<String>,
    /// Copies owned by the library
    pub total_copies: u32,
    /// Copies currently on the shelf
    pub available_copies: u32,
}

impl Book {
    /// Check if at least one copy can be lent out.
    pub fn is_available(&self) -> bool {
        self.available_copies > 0
    }

    /// Count of copies currently on loan.
    pub fn copies_on_loan(&self) -> u32 {
        self.total_copies - self.available_copies
    }
}

/// Input for registering a book, validated before it enters the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewBook {
    #[garde(length(min = 1))]
    pub isbn: String,
    #[garde(length(min = 1))]
    pub title: String,
    #[garde(length(min = 1))]
    pub author: String,
    #[garde(skip)]
    pub category: Option<String>,
    #[garde(range(min = 1))]
    pub total_copies: u32,
}

impl NewBook {
    /// Build the stored form. Every copy starts on the shelf.
    pub fn into_book(self) -> Book {
        Book {
            isbn: self.isbn,
            title: self.title,
            author: self.author,
            category: self.category,
            total_copies: self.total_copies,
            available_copies: self.total_copies,
        }
    }
}
