pub mod models;
pub mod routes;
pub mod store;

use async_trait::async_trait;
use axum::Router;
use libris_kernel::{InitCtx, Migration, Module};
use serde_json::{json, Value};

use crate::store::RecordStore;

/// Authors module: author records and the books they own
pub struct AuthorsModule {
    store: RecordStore,
}

impl AuthorsModule {
    pub const fn new(store: RecordStore) -> Self {
        Self { store }
    }
}

fn error_response(description: &str) -> Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/ErrorResponse" }
            }
        }
    })
}

fn json_response(description: &str, schema: Value) -> Value {
    json!({
        "description": description,
        "content": { "application/json": { "schema": schema } }
    })
}

fn id_parameter() -> Value {
    json!({
        "name": "id",
        "in": "path",
        "required": true,
        "schema": { "type": "integer", "format": "int64" }
    })
}

#[async_trait]
impl Module for AuthorsModule {
    fn name(&self) -> &'static str {
        "authors"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "authors module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.store.clone())
    }

    fn openapi(&self) -> Option<Value> {
        let author = json!({ "$ref": "#/components/schemas/Author" });
        let author_list = json!({ "type": "array", "items": author });
        let book_list = json!({
            "type": "array",
            "items": { "$ref": "#/components/schemas/Book" }
        });

        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List authors",
                        "tags": ["Authors"],
                        "parameters": [{
                            "name": "nationality",
                            "in": "query",
                            "required": false,
                            "schema": { "type": "string" }
                        }],
                        "responses": {
                            "200": json_response("Matching authors", author_list),
                            "404": error_response("No author matched the filters")
                        }
                    },
                    "post": {
                        "summary": "Create an author",
                        "tags": ["Authors"],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/NewAuthor" }
                                }
                            }
                        },
                        "responses": {
                            "201": json_response("Created author", author.clone()),
                            "400": error_response("Invalid field value")
                        }
                    }
                },
                "/{id}": {
                    "get": {
                        "summary": "Get an author",
                        "tags": ["Authors"],
                        "parameters": [id_parameter()],
                        "responses": {
                            "200": json_response("Author", author.clone()),
                            "404": error_response("Author not found")
                        }
                    },
                    "patch": {
                        "summary": "Merge-patch an author",
                        "tags": ["Authors"],
                        "parameters": [id_parameter()],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/AuthorPatch" }
                                }
                            }
                        },
                        "responses": {
                            "200": json_response("Updated author", author.clone()),
                            "400": error_response("Invalid field value"),
                            "404": error_response("Author not found")
                        }
                    },
                    "delete": {
                        "summary": "Delete an author, orphaning their books",
                        "tags": ["Authors"],
                        "parameters": [id_parameter()],
                        "responses": {
                            "200": json_response(
                                "Author deleted",
                                json!({ "$ref": "#/components/schemas/AuthorDeleted" })
                            ),
                            "404": error_response("Author not found")
                        }
                    }
                },
                "/{id}/books": {
                    "get": {
                        "summary": "List the books owned by an author",
                        "tags": ["Authors"],
                        "parameters": [id_parameter()],
                        "responses": {
                            "200": json_response("Books of the author", book_list),
                            "404": error_response("Author not found or owns no books")
                        }
                    }
                },
                "/health": {
                    "get": {
                        "summary": "Authors health check",
                        "tags": ["Authors"],
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
                    "Author": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer", "format": "int64" },
                            "name": { "type": "string" },
                            "nationality": { "type": ["string", "null"] },
                            "age": { "type": ["integer", "null"], "minimum": 0 }
                        },
                        "required": ["id", "name"]
                    },
                    "NewAuthor": {
                        "type": "object",
                        "properties": {
                            "name": { "type": "string", "minLength": 1 },
                            "nationality": { "type": ["string", "null"] },
                            "age": { "type": ["integer", "null"], "minimum": 0 }
                        },
                        "required": ["name"]
                    },
                    "AuthorPatch": {
                        "type": "object",
                        "description": "Only the fields present are changed; null clears optional fields",
                        "properties": {
                            "name": { "type": "string", "minLength": 1 },
                            "nationality": { "type": ["string", "null"] },
                            "age": { "type": ["integer", "null"], "minimum": 0 }
                        }
                    },
                    "AuthorDeleted": {
                        "type": "object",
                        "properties": {
                            "message": { "type": "string" },
                            "orphaned_books": { "type": "integer", "minimum": 0 }
                        },
                        "required": ["message", "orphaned_books"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_init",
            up: r#"
                CREATE TABLE authors (
                    id          INTEGER PRIMARY KEY AUTOINCREMENT,
                    name        TEXT NOT NULL CHECK (name <> ''),
                    nationality TEXT,
                    age         INTEGER CHECK (age >= 0)
                );
                "#,
        }]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "authors module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "authors module stopped");
        Ok(())
    }
}

/// Create a new instance of the authors module
pub fn create_module(store: RecordStore) -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(AuthorsModule::new(store))
}
