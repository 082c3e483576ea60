use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};

use libris_http::error::AppError;

use super::models::{Author, AuthorDeleted, AuthorFilter, AuthorPatch, NewAuthor};
use crate::modules::books::models::Book;
use crate::store::RecordStore;

/// HTTP routes of the authors module, relative to `/api/authors`.
pub fn router(store: RecordStore) -> Router {
    Router::new()
        .route("/", get(list_authors).post(create_author))
        .route("/health", get(health_check))
        .route(
            "/{id}",
            get(get_author).patch(update_author).delete(delete_author),
        )
        .route("/{id}/books", get(list_books_by_author))
        .with_state(store)
}

async fn health_check() -> &'static str {
    "authors module is healthy"
}

async fn create_author(
    State(store): State<RecordStore>,
    payload: Result<Json<NewAuthor>, JsonRejection>,
) -> Result<(StatusCode, Json<Author>), AppError> {
    let Json(new) = payload?;
    let author = store.create_author(new).await?;
    Ok((StatusCode::CREATED, Json(author)))
}

async fn list_authors(
    State(store): State<RecordStore>,
    filter: Result<Query<AuthorFilter>, QueryRejection>,
) -> Result<Json<Vec<Author>>, AppError> {
    let Query(filter) = filter?;
    Ok(Json(store.list_authors(&filter).await?))
}

async fn get_author(
    State(store): State<RecordStore>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Author>, AppError> {
    let Path(id) = id?;
    Ok(Json(store.get_author(id).await?))
}

async fn update_author(
    State(store): State<RecordStore>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<AuthorPatch>, JsonRejection>,
) -> Result<Json<Author>, AppError> {
    let Path(id) = id?;
    let Json(patch) = payload?;
    Ok(Json(store.update_author(id, patch).await?))
}

async fn delete_author(
    State(store): State<RecordStore>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<AuthorDeleted>, AppError> {
    let Path(id) = id?;
    Ok(Json(store.delete_author(id).await?))
}

async fn list_books_by_author(
    State(store): State<RecordStore>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Vec<Book>>, AppError> {
    let Path(id) = id?;
    Ok(Json(store.list_books_by_author(id).await?))
}
