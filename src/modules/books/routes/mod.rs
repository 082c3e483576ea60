use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};

use libris_http::error::AppError;

use super::models::{Book, BookDeleted, BookFilter, BookPatch, NewBook};
use crate::modules::authors::models::Author;
use crate::store::RecordStore;

/// HTTP routes of the books module, relative to `/api/books`.
pub fn router(store: RecordStore) -> Router {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route("/health", get(health_check))
        .route("/{id}", get(get_book).patch(update_book).delete(delete_book))
        .route(
            "/{id}/author",
            get(get_owning_author).delete(unassign_author),
        )
        .route("/{id}/author/{author_id}", put(assign_author))
        .with_state(store)
}

async fn health_check() -> &'static str {
    "books module is healthy"
}

async fn create_book(
    State(store): State<RecordStore>,
    payload: Result<Json<NewBook>, JsonRejection>,
) -> Result<(StatusCode, Json<Book>), AppError> {
    let Json(new) = payload?;
    let book = store.create_book(new).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

async fn list_books(
    State(store): State<RecordStore>,
    filter: Result<Query<BookFilter>, QueryRejection>,
) -> Result<Json<Vec<Book>>, AppError> {
    let Query(filter) = filter?;
    Ok(Json(store.list_books(&filter).await?))
}

async fn get_book(
    State(store): State<RecordStore>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Book>, AppError> {
    let Path(id) = id?;
    Ok(Json(store.get_book(id).await?))
}

async fn update_book(
    State(store): State<RecordStore>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<BookPatch>, JsonRejection>,
) -> Result<Json<Book>, AppError> {
    let Path(id) = id?;
    let Json(patch) = payload?;
    Ok(Json(store.update_book(id, patch).await?))
}

async fn delete_book(
    State(store): State<RecordStore>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<BookDeleted>, AppError> {
    let Path(id) = id?;
    Ok(Json(store.delete_book(id).await?))
}

async fn assign_author(
    State(store): State<RecordStore>,
    ids: Result<Path<(i64, i64)>, PathRejection>,
) -> Result<Json<Book>, AppError> {
    let Path((book_id, author_id)) = ids?;
    Ok(Json(store.assign_author(book_id, author_id).await?))
}

async fn unassign_author(
    State(store): State<RecordStore>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Book>, AppError> {
    let Path(id) = id?;
    Ok(Json(store.unassign_author(id).await?))
}

async fn get_owning_author(
    State(store): State<RecordStore>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Author>, AppError> {
    let Path(id) = id?;
    Ok(Json(store.get_owning_author(id).await?))
}
