//! Author operations of the record store.

use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use super::models::{Author, AuthorDeleted, AuthorFilter, AuthorPatch, NewAuthor};
use crate::modules::books::models::Book;
use crate::store::{require_non_empty, RecordStore, StoreError, StoreResult};

pub(crate) async fn fetch_author(
    conn: &mut SqliteConnection,
    id: i64,
) -> Result<Option<Author>, sqlx::Error> {
    sqlx::query_as::<_, Author>("SELECT id, name, nationality, age FROM authors WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
}

pub(crate) async fn author_exists(
    conn: &mut SqliteConnection,
    id: i64,
) -> Result<bool, sqlx::Error> {
    let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM authors WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(found.is_some())
}

fn author_not_found(id: i64) -> StoreError {
    StoreError::not_found(format!("author {id} not found"))
}

impl RecordStore {
    /// Create an author. Names are not required to be unique.
    pub async fn create_author(&self, new: NewAuthor) -> StoreResult<Author> {
        require_non_empty(&new.name, "name")?;

        let mut tx = self.begin_write().await?;

        let author = sqlx::query_as::<_, Author>(
            "INSERT INTO authors (name, nationality, age) VALUES (?, ?, ?)
             RETURNING id, name, nationality, age",
        )
        .bind(&new.name)
        .bind(&new.nationality)
        .bind(new.age)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(author_id = author.id, "author created");
        Ok(author)
    }

    /// List authors, optionally filtered by exact nationality. An empty
    /// result is reported as `NotFound`.
    pub async fn list_authors(&self, filter: &AuthorFilter) -> StoreResult<Vec<Author>> {
        let mut query: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new("SELECT id, name, nationality, age FROM authors");
        if let Some(nationality) = &filter.nationality {
            query.push(" WHERE nationality = ").push_bind(nationality);
        }
        query.push(" ORDER BY id");

        let authors = query
            .build_query_as::<Author>()
            .fetch_all(self.pool())
            .await?;

        if authors.is_empty() {
            return Err(StoreError::not_found("no authors matched the given filters"));
        }
        Ok(authors)
    }

    pub async fn get_author(&self, id: i64) -> StoreResult<Author> {
        let mut conn = self.pool().acquire().await?;
        fetch_author(&mut conn, id)
            .await?
            .ok_or_else(|| author_not_found(id))
    }

    /// Apply a merge-patch; only fields present in `patch` change.
    pub async fn update_author(&self, id: i64, patch: AuthorPatch) -> StoreResult<Author> {
        let mut tx = self.begin_write().await?;

        let mut author = fetch_author(&mut tx, id)
            .await?
            .ok_or_else(|| author_not_found(id))?;

        patch.name.apply_required(&mut author.name, "name")?;
        require_non_empty(&author.name, "name")?;
        patch.nationality.apply(&mut author.nationality);
        patch.age.apply(&mut author.age);

        sqlx::query("UPDATE authors SET name = ?, nationality = ?, age = ? WHERE id = ?")
            .bind(&author.name)
            .bind(&author.nationality)
            .bind(author.age)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(author_id = id, "author updated");
        Ok(author)
    }

    /// Delete an author. Books owned by the author are orphaned (their
    /// `author_id` cleared) in the same transaction, never deleted.
    pub async fn delete_author(&self, id: i64) -> StoreResult<AuthorDeleted> {
        let mut tx = self.begin_write().await?;

        if !author_exists(&mut tx, id).await? {
            return Err(author_not_found(id));
        }

        let orphaned_books = sqlx::query("UPDATE books SET author_id = NULL WHERE author_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        sqlx::query("DELETE FROM authors WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(author_id = id, orphaned_books, "author deleted");
        Ok(AuthorDeleted {
            message: "author deleted".to_string(),
            orphaned_books,
        })
    }

    /// Books owned by an author. Both a missing author and an author without
    /// books are reported as `NotFound`.
    pub async fn list_books_by_author(&self, id: i64) -> StoreResult<Vec<Book>> {
        let mut conn = self.pool().acquire().await?;

        if !author_exists(&mut conn, id).await? {
            return Err(author_not_found(id));
        }

        let books = sqlx::query_as::<_, Book>(
            "SELECT id, title, genre, publication_year, isbn, available_copies, author_id
             FROM books WHERE author_id = ? ORDER BY id",
        )
        .bind(id)
        .fetch_all(&mut *conn)
        .await?;

        if books.is_empty() {
            return Err(StoreError::not_found(format!("author {id} has no books")));
        }
        Ok(books)
    }
}
