pub mod models;
pub mod routes;
pub mod store;

use async_trait::async_trait;
use axum::Router;
use libris_kernel::{InitCtx, Migration, Module};
use serde_json::{json, Value};

use crate::store::RecordStore;

/// Books module: book records and their optional owning author
pub struct BooksModule {
    store: RecordStore,
}

impl BooksModule {
    pub const fn new(store: RecordStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.store.clone())
    }

    fn openapi(&self) -> Option<Value> {
        let book = json!({ "$ref": "#/components/schemas/Book" });
        let error = json!({
            "application/json": {
                "schema": { "$ref": "#/components/schemas/ErrorResponse" }
            }
        });
        let id = json!({
            "name": "id",
            "in": "path",
            "required": true,
            "schema": { "type": "integer", "format": "int64" }
        });
        let author_id = json!({
            "name": "author_id",
            "in": "path",
            "required": true,
            "schema": { "type": "integer", "format": "int64" }
        });

        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List books",
                        "tags": ["Books"],
                        "parameters": [
                            { "name": "genre", "in": "query", "required": false, "schema": { "type": "string" } },
                            { "name": "year", "in": "query", "required": false, "schema": { "type": "integer" } },
                            { "name": "author_id", "in": "query", "required": false, "schema": { "type": "integer", "format": "int64" } }
                        ],
                        "responses": {
                            "200": {
                                "description": "Books matching every filter",
                                "content": {
                                    "application/json": {
                                        "schema": { "type": "array", "items": book }
                                    }
                                }
                            },
                            "404": { "description": "No book matched the filters", "content": error }
                        }
                    },
                    "post": {
                        "summary": "Create a book",
                        "tags": ["Books"],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/NewBook" }
                                }
                            }
                        },
                        "responses": {
                            "201": {
                                "description": "Created book",
                                "content": { "application/json": { "schema": book } }
                            },
                            "400": { "description": "Negative available_copies or blank title", "content": error },
                            "404": { "description": "Referenced author does not exist", "content": error },
                            "409": { "description": "ISBN already in use", "content": error }
                        }
                    }
                },
                "/{id}": {
                    "get": {
                        "summary": "Get a book",
                        "tags": ["Books"],
                        "parameters": [id],
                        "responses": {
                            "200": {
                                "description": "Book",
                                "content": { "application/json": { "schema": book } }
                            },
                            "404": { "description": "Book not found", "content": error }
                        }
                    },
                    "patch": {
                        "summary": "Merge-patch a book",
                        "tags": ["Books"],
                        "parameters": [id],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/BookPatch" }
                                }
                            }
                        },
                        "responses": {
                            "200": {
                                "description": "Updated book",
                                "content": { "application/json": { "schema": book } }
                            },
                            "400": { "description": "Invalid field value", "content": error },
                            "404": { "description": "Book or new author not found", "content": error },
                            "409": { "description": "ISBN already in use", "content": error }
                        }
                    },
                    "delete": {
                        "summary": "Delete a book",
                        "tags": ["Books"],
                        "parameters": [id],
                        "responses": {
                            "200": {
                                "description": "Book deleted",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/BookDeleted" }
                                    }
                                }
                            },
                            "404": { "description": "Book not found", "content": error }
                        }
                    }
                },
                "/{id}/author": {
                    "get": {
                        "summary": "Get the author owning a book",
                        "tags": ["Books"],
                        "parameters": [id],
                        "responses": {
                            "200": {
                                "description": "Owning author",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Author" }
                                    }
                                }
                            },
                            "404": { "description": "Book not found or has no author", "content": error }
                        }
                    },
                    "delete": {
                        "summary": "Unassign the book's author",
                        "tags": ["Books"],
                        "parameters": [id],
                        "responses": {
                            "200": {
                                "description": "Book without author",
                                "content": { "application/json": { "schema": book } }
                            },
                            "404": { "description": "Book not found", "content": error }
                        }
                    }
                },
                "/{id}/author/{author_id}": {
                    "put": {
                        "summary": "Assign an author to a book",
                        "tags": ["Books"],
                        "parameters": [id, author_id],
                        "responses": {
                            "200": {
                                "description": "Book with its new author",
                                "content": { "application/json": { "schema": book } }
                            },
                            "404": { "description": "Book or author not found", "content": error }
                        }
                    }
                },
                "/health": {
                    "get": {
                        "summary": "Books health check",
                        "tags": ["Books"],
                        "responses": {
                            "200": {
                                "description": "OK",
                                "content": { "text/plain": { "schema": { "type": "string" } } }
                            }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer", "format": "int64" },
                            "title": { "type": "string" },
                            "genre": { "type": ["string", "null"] },
                            "publication_year": { "type": ["integer", "null"] },
                            "isbn": { "type": ["string", "null"], "description": "Unique across books" },
                            "available_copies": { "type": ["integer", "null"], "minimum": 0 },
                            "author_id": { "type": ["integer", "null"], "format": "int64" }
                        },
                        "required": ["id", "title"]
                    },
                    "NewBook": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string", "minLength": 1 },
                            "genre": { "type": ["string", "null"] },
                            "publication_year": { "type": ["integer", "null"] },
                            "isbn": { "type": ["string", "null"] },
                            "available_copies": { "type": ["integer", "null"], "minimum": 0 },
                            "author_id": { "type": ["integer", "null"], "format": "int64" }
                        },
                        "required": ["title"]
                    },
                    "BookPatch": {
                        "type": "object",
                        "description": "Only the fields present are changed; null clears optional fields",
                        "properties": {
                            "title": { "type": "string", "minLength": 1 },
                            "genre": { "type": ["string", "null"] },
                            "publication_year": { "type": ["integer", "null"] },
                            "isbn": { "type": ["string", "null"] },
                            "available_copies": { "type": ["integer", "null"], "minimum": 0 },
                            "author_id": { "type": ["integer", "null"], "format": "int64" }
                        }
                    },
                    "BookDeleted": {
                        "type": "object",
                        "properties": { "message": { "type": "string" } },
                        "required": ["message"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_init",
            up: r#"
                CREATE TABLE books (
                    id               INTEGER PRIMARY KEY AUTOINCREMENT,
                    title            TEXT NOT NULL CHECK (title <> ''),
                    genre            TEXT,
                    publication_year INTEGER,
                    isbn             TEXT UNIQUE,
                    available_copies INTEGER CHECK (available_copies >= 0),
                    author_id        INTEGER REFERENCES authors (id)
                );
                CREATE INDEX books_author_id_idx ON books (author_id);
                "#,
        }]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create a new instance of the books module
pub fn create_module(store: RecordStore) -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(BooksModule::new(store))
}
