//! Book operations of the record store, including the author assignment
//! helpers.

use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use super::models::{Book, BookDeleted, BookFilter, BookPatch, NewBook};
use crate::modules::authors::models::Author;
use crate::modules::authors::store::{author_exists, fetch_author};
use crate::store::{require_non_empty, Patch, RecordStore, StoreError, StoreResult};

const BOOK_COLUMNS: &str =
    "id, title, genre, publication_year, isbn, available_copies, author_id";

async fn fetch_book(conn: &mut SqliteConnection, id: i64) -> Result<Option<Book>, sqlx::Error> {
    sqlx::query_as::<_, Book>(&format!("SELECT {BOOK_COLUMNS} FROM books WHERE id = ?"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
}

async fn isbn_taken(conn: &mut SqliteConnection, isbn: &str) -> Result<bool, sqlx::Error> {
    let found: Option<i64> = sqlx::query_scalar("SELECT id FROM books WHERE isbn = ? LIMIT 1")
        .bind(isbn)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(found.is_some())
}

async fn write_book(conn: &mut SqliteConnection, book: &Book) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE books
         SET title = ?, genre = ?, publication_year = ?, isbn = ?, available_copies = ?, author_id = ?
         WHERE id = ?",
    )
    .bind(&book.title)
    .bind(&book.genre)
    .bind(book.publication_year)
    .bind(&book.isbn)
    .bind(book.available_copies)
    .bind(book.author_id)
    .bind(book.id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

fn book_not_found(id: i64) -> StoreError {
    StoreError::not_found(format!("book {id} not found"))
}

fn isbn_conflict(isbn: &str) -> StoreError {
    StoreError::conflict(format!("a book with isbn '{isbn}' already exists"))
}

fn check_copies(copies: i64) -> StoreResult<()> {
    if copies < 0 {
        return Err(StoreError::invalid_argument(
            "available_copies must be greater than or equal to 0",
        ));
    }
    Ok(())
}

impl RecordStore {
    /// Create a book.
    ///
    /// Checks run in a fixed order so the reported error is deterministic:
    /// ISBN uniqueness, then the copies count, then the author reference.
    pub async fn create_book(&self, new: NewBook) -> StoreResult<Book> {
        require_non_empty(&new.title, "title")?;

        let mut tx = self.begin_write().await?;

        if let Some(isbn) = &new.isbn {
            if isbn_taken(&mut tx, isbn).await? {
                tracing::warn!(%isbn, "rejected book with duplicate isbn");
                return Err(isbn_conflict(isbn));
            }
        }

        if let Some(copies) = new.available_copies {
            check_copies(copies)?;
        }

        if let Some(author_id) = new.author_id {
            if !author_exists(&mut tx, author_id).await? {
                return Err(StoreError::not_found(format!("author {author_id} does not exist")));
            }
        }

        let book = sqlx::query_as::<_, Book>(&format!(
            "INSERT INTO books (title, genre, publication_year, isbn, available_copies, author_id)
             VALUES (?, ?, ?, ?, ?, ?)
             RETURNING {BOOK_COLUMNS}"
        ))
        .bind(&new.title)
        .bind(&new.genre)
        .bind(new.publication_year)
        .bind(&new.isbn)
        .bind(new.available_copies)
        .bind(new.author_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(book_id = book.id, author_id = ?book.author_id, "book created");
        Ok(book)
    }

    /// List books matching every provided filter. An empty result is
    /// reported as `NotFound`.
    pub async fn list_books(&self, filter: &BookFilter) -> StoreResult<Vec<Book>> {
        let mut query: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new(format!("SELECT {BOOK_COLUMNS} FROM books WHERE 1 = 1"));

        if let Some(genre) = &filter.genre {
            query.push(" AND genre = ").push_bind(genre);
        }
        if let Some(year) = filter.year {
            query.push(" AND publication_year = ").push_bind(year);
        }
        if let Some(author_id) = filter.author_id {
            query.push(" AND author_id = ").push_bind(author_id);
        }
        query.push(" ORDER BY id");

        let books = query.build_query_as::<Book>().fetch_all(self.pool()).await?;

        if books.is_empty() {
            return Err(StoreError::not_found("no books matched the given filters"));
        }
        Ok(books)
    }

    pub async fn get_book(&self, id: i64) -> StoreResult<Book> {
        let mut conn = self.pool().acquire().await?;
        fetch_book(&mut conn, id)
            .await?
            .ok_or_else(|| book_not_found(id))
    }

    /// Apply a merge-patch. Each invariant is re-checked only for the
    /// fields the patch actually changes.
    pub async fn update_book(&self, id: i64, patch: BookPatch) -> StoreResult<Book> {
        let mut tx = self.begin_write().await?;

        let mut book = fetch_book(&mut tx, id)
            .await?
            .ok_or_else(|| book_not_found(id))?;

        if let Patch::Value(isbn) = &patch.isbn {
            if book.isbn.as_ref() != Some(isbn) && isbn_taken(&mut tx, isbn).await? {
                tracing::warn!(book_id = id, %isbn, "rejected isbn change to a taken value");
                return Err(isbn_conflict(isbn));
            }
        }

        if let Patch::Value(author_id) = patch.author_id {
            if book.author_id != Some(author_id) && !author_exists(&mut tx, author_id).await? {
                return Err(StoreError::not_found(format!("new author {author_id} not found")));
            }
        }

        if let Patch::Value(copies) = patch.available_copies {
            check_copies(copies)?;
        }

        patch.title.apply_required(&mut book.title, "title")?;
        require_non_empty(&book.title, "title")?;
        patch.genre.apply(&mut book.genre);
        patch.publication_year.apply(&mut book.publication_year);
        patch.author_id.apply(&mut book.author_id);
        patch.isbn.apply(&mut book.isbn);
        patch.available_copies.apply(&mut book.available_copies);

        write_book(&mut tx, &book).await?;
        tx.commit().await?;

        tracing::info!(book_id = id, "book updated");
        Ok(book)
    }

    /// Delete a book. Its author, if any, is not affected.
    pub async fn delete_book(&self, id: i64) -> StoreResult<BookDeleted> {
        let deleted = sqlx::query("DELETE FROM books WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await?
            .rows_affected();

        if deleted == 0 {
            return Err(book_not_found(id));
        }

        tracing::info!(book_id = id, "book deleted");
        Ok(BookDeleted {
            message: "book deleted".to_string(),
        })
    }

    /// Make `author_id` the owner of the book.
    pub async fn assign_author(&self, book_id: i64, author_id: i64) -> StoreResult<Book> {
        let mut tx = self.begin_write().await?;

        let mut book = fetch_book(&mut tx, book_id)
            .await?
            .ok_or_else(|| book_not_found(book_id))?;

        if !author_exists(&mut tx, author_id).await? {
            return Err(StoreError::not_found(format!("author {author_id} not found")));
        }

        book.author_id = Some(author_id);
        write_book(&mut tx, &book).await?;
        tx.commit().await?;

        tracing::info!(book_id, author_id, "author assigned to book");
        Ok(book)
    }

    /// Clear the book's owner. The book itself is kept.
    pub async fn unassign_author(&self, book_id: i64) -> StoreResult<Book> {
        let mut tx = self.begin_write().await?;

        let mut book = fetch_book(&mut tx, book_id)
            .await?
            .ok_or_else(|| book_not_found(book_id))?;

        book.author_id = None;
        write_book(&mut tx, &book).await?;
        tx.commit().await?;

        tracing::info!(book_id, "author unassigned from book");
        Ok(book)
    }

    /// The author owning a book; `NotFound` when the book is missing or has
    /// no author.
    pub async fn get_owning_author(&self, book_id: i64) -> StoreResult<Author> {
        let mut conn = self.pool().acquire().await?;

        let book = fetch_book(&mut conn, book_id)
            .await?
            .ok_or_else(|| book_not_found(book_id))?;

        let author_id = book.author_id.ok_or_else(|| {
            StoreError::not_found(format!("book {book_id} has no assigned author"))
        })?;

        fetch_author(&mut conn, author_id)
            .await?
            .ok_or_else(|| StoreError::not_found(format!("author {author_id} not found")))
    }
}
