mod common;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn router() -> Router {
    let app = common::app().await;
    app.router(&common::settings())
}

async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_vec(&json).unwrap())
        }
        None => Body::empty(),
    };

    let response = router
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}

async fn get(router: &Router, uri: &str) -> (StatusCode, Value) {
    send(router, Method::GET, uri, None).await
}

async fn post(router: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(router, Method::POST, uri, Some(body)).await
}

async fn patch(router: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(router, Method::PATCH, uri, Some(body)).await
}

async fn delete(router: &Router, uri: &str) -> (StatusCode, Value) {
    send(router, Method::DELETE, uri, None).await
}

#[tokio::test]
async fn borges_end_to_end_over_http() {
    let router = router().await;

    let (status, author) = post(&router, "/api/authors", json!({"name": "Borges"})).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(author["id"], 1);

    let ficciones = json!({"title": "Ficciones", "author_id": 1});
    let (status, book) = post(&router, "/api/books", ficciones).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(book["id"], 1);
    assert_eq!(book["isbn"], Value::Null);

    let (status, books) = get(&router, "/api/authors/1/books").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(books, json!([book]));

    let (status, ack) = delete(&router, "/api/authors/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack["orphaned_books"], 1);

    let (status, book) = get(&router, "/api/books/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(book["author_id"], Value::Null);

    let (status, error) = get(&router, "/api/authors/1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["error"]["code"], "not_found");
}

#[tokio::test]
async fn author_merge_patch_over_http() {
    let router = router().await;
    post(&router, "/api/authors", json!({"name": "Ana", "nationality": "AR", "age": 40})).await;

    let (status, author) = patch(&router, "/api/authors/1", json!({"age": 41})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(author, json!({"id": 1, "name": "Ana", "nationality": "AR", "age": 41}));

    let (status, author) = patch(&router, "/api/authors/1", json!({"nationality": null})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(author["nationality"], Value::Null);
    assert_eq!(author["age"], 41);
}

#[tokio::test]
async fn list_filters_and_empty_results() {
    let router = router().await;

    let (status, _) = get(&router, "/api/authors").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    post(&router, "/api/authors", json!({"name": "Borges", "nationality": "AR"})).await;
    post(&router, "/api/authors", json!({"name": "Onetti", "nationality": "UY"})).await;

    let (status, authors) = get(&router, "/api/authors?nationality=UY").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(authors.as_array().unwrap().len(), 1);
    assert_eq!(authors[0]["name"], "Onetti");

    let ficciones = json!({
        "title": "Ficciones",
        "genre": "fiction",
        "publication_year": 1944,
        "author_id": 1
    });
    post(&router, "/api/books", ficciones).await;

    let (status, books) = get(&router, "/api/books?genre=fiction&year=1944&author_id=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(books.as_array().unwrap().len(), 1);

    let (status, error) = get(&router, "/api/books?genre=poetry").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["error"]["message"], "no books matched the given filters");

    let (status, _) = get(&router, "/api/books?year=not-a-year").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn book_validation_errors_map_to_statuses() {
    let router = router().await;

    let (status, _) = post(&router, "/api/books", json!({"title": "A", "isbn": "123"})).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, error) = post(&router, "/api/books", json!({"title": "B", "isbn": "123"})).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error["error"]["code"], "conflict");

    let negative = json!({"title": "C", "available_copies": -1});
    let (status, error) = post(&router, "/api/books", negative).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"]["code"], "bad_request");

    let (status, _) = post(&router, "/api/books", json!({"title": "D", "author_id": 5})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = post(&router, "/api/books", json!({"genre": "no title"})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = post(&router, "/api/authors", json!({"name": "Young", "age": -1})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, books) = get(&router, "/api/books").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(books.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn assignment_routes() {
    let router = router().await;
    post(&router, "/api/authors", json!({"name": "Borges"})).await;
    post(&router, "/api/books", json!({"title": "Ficciones"})).await;

    let (status, _) = get(&router, "/api/books/1/author").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&router, Method::PUT, "/api/books/1/author/9", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, book) = send(&router, Method::PUT, "/api/books/1/author/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(book["author_id"], 1);

    let (status, author) = get(&router, "/api/books/1/author").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(author["name"], "Borges");

    let (status, book) = delete(&router, "/api/books/1/author").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(book["author_id"], Value::Null);

    let (status, ack) = delete(&router, "/api/books/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack["message"], "book deleted");

    let (status, _) = delete(&router, "/api/books/1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_path_is_a_bad_request() {
    let router = router().await;
    let (status, error) = get(&router, "/api/books/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"]["code"], "bad_request");
}

#[tokio::test]
async fn openapi_document_covers_both_modules() {
    let router = router().await;
    let (status, spec) = get(&router, "/docs/openapi.json").await;
    assert_eq!(status, StatusCode::OK);

    for path in [
        "/api/authors",
        "/api/authors/{id}",
        "/api/authors/{id}/books",
        "/api/books",
        "/api/books/{id}",
        "/api/books/{id}/author",
        "/api/books/{id}/author/{author_id}",
    ] {
        assert!(spec["paths"][path].is_object(), "missing {path}");
    }
    assert!(spec["components"]["schemas"]["Author"].is_object());
    assert!(spec["components"]["schemas"]["Book"].is_object());
}

#[tokio::test]
async fn module_health_checks() {
    let router = router().await;
    let (status, body) = get(&router, "/api/books/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "books module is healthy");
}
