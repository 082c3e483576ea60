//! Record store: validation and persistence orchestration for authors and
//! books.
//!
//! The operations themselves live next to their entities in
//! `modules::authors::store` and `modules::books::store`; this module owns
//! the shared handle, the error type and the merge-patch wrapper.
//!
//! Every mutating operation runs its existence/uniqueness checks and its
//! writes inside a single transaction, so either all of its changes become
//! visible or none do. Those transactions take the SQLite write lock up
//! front, so concurrent writers queue behind each other instead of failing
//! when a read lock cannot be upgraded.

mod error;
mod patch;

use sqlx::{Sqlite, SqlitePool, Transaction};

pub use error::{StoreError, StoreResult};
pub use patch::Patch;

/// Cloneable handle over the relational storage pool.
#[derive(Debug, Clone)]
pub struct RecordStore {
    pool: SqlitePool,
}

impl RecordStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Open a transaction holding the write lock (`BEGIN IMMEDIATE`).
    pub(crate) async fn begin_write(&self) -> Result<Transaction<'static, Sqlite>, sqlx::Error> {
        self.pool.begin_with("BEGIN IMMEDIATE").await
    }
}

/// Reject blank values for required text columns.
pub(crate) fn require_non_empty(value: &str, field: &str) -> StoreResult<()> {
    if value.trim().is_empty() {
        return Err(StoreError::invalid_argument(format!("{field} must not be empty")));
    }
    Ok(())
}
