use serde::{Deserialize, Serialize};

use crate::store::Patch;

/// A book, optionally owned by one author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Book {
    /// Storage-assigned identifier
    pub id: i64,
    pub title: String,
    pub genre: Option<String>,
    pub publication_year: Option<i32>,
    /// Globally unique when set
    pub isbn: Option<String>,
    /// Never negative when set
    pub available_copies: Option<i64>,
    pub author_id: Option<i64>,
}

/// Request model for creating a new book.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewBook {
    pub title: String,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub publication_year: Option<i32>,
    #[serde(default)]
    pub author_id: Option<i64>,
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub available_copies: Option<i64>,
}

/// Merge-patch for a book; omitted fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookPatch {
    #[serde(default)]
    pub title: Patch<String>,
    #[serde(default)]
    pub genre: Patch<String>,
    #[serde(default)]
    pub publication_year: Patch<i32>,
    #[serde(default)]
    pub author_id: Patch<i64>,
    #[serde(default)]
    pub isbn: Patch<String>,
    #[serde(default)]
    pub available_copies: Patch<i64>,
}

/// Exact-match filters for listing books, AND-combined.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookFilter {
    pub genre: Option<String>,
    pub year: Option<i32>,
    pub author_id: Option<i64>,
}

/// Acknowledgment returned after a book is removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookDeleted {
    pub message: String,
}
