use serde::{Deserialize, Serialize};

use crate::store::Patch;

/// An author, owner of zero or more books.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Author {
    /// Storage-assigned identifier
    pub id: i64,
    pub name: String,
    pub nationality: Option<String>,
    pub age: Option<u32>,
}

/// Request model for creating a new author.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewAuthor {
    pub name: String,
    #[serde(default)]
    pub nationality: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
}

/// Merge-patch for an author; omitted fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthorPatch {
    #[serde(default)]
    pub name: Patch<String>,
    #[serde(default)]
    pub nationality: Patch<String>,
    #[serde(default)]
    pub age: Patch<u32>,
}

/// Exact-match filters for listing authors.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthorFilter {
    pub nationality: Option<String>,
}

/// Acknowledgment returned after an author is removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorDeleted {
    pub message: String,
    /// Books whose `author_id` was cleared by the deletion
    pub orphaned_books: u64,
}
