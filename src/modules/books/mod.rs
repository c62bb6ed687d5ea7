pub mod error;
pub mod models;
pub mod routes;
pub mod service;
pub mod validation;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use quire_authz::IdentityResolverArc;
use quire_db::StoreHandle;
use quire_kernel::{InitCtx, Module};
use serde_json::{json, Value};

use routes::BooksState;
use service::BookService;

/// Book catalogue: public reads, owner-only writes.
pub struct BooksModule {
    state: BooksState,
}

impl BooksModule {
    pub fn new(store: StoreHandle, identity: IdentityResolverArc) -> Self {
        Self {
            state: BooksState {
                service: BookService::new(store),
                identity,
            },
        }
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

    fn routes(&self) -> Option<Router> {
        Some(routes::router(self.state.clone()))
    }

    fn openapi(&self) -> Option<Value> {
        Some(openapi_fragment())
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

/// Create the books module over a shared store and identity resolver
pub fn create_module(store: StoreHandle, identity: IdentityResolverArc) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(store, identity))
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

fn book_ref() -> Value {
    json!({ "$ref": "#/components/schemas/Book" })
}

fn book_list() -> Value {
    json!({ "type": "array", "items": book_ref() })
}

fn json_body(schema: &str) -> Value {
    json!({
        "required": true,
        "content": {
            "application/json": {
                "schema": { "$ref": format!("#/components/schemas/{schema}") }
            }
        }
    })
}

fn openapi_fragment() -> Value {
    let bearer = json!([{ "bearerAuth": [] }]);
    let key_param = json!([{
        "name": "key",
        "in": "path",
        "required": true,
        "description": "Book id (24 hex characters) or author fragment",
        "schema": { "type": "string" }
    }]);

    json!({
        "paths": {
            "/": {
                "get": {
                    "summary": "List books, newest first",
                    "tags": ["Books"],
                    "responses": {
                        "200": json_response("All books", book_list()),
                        "500": error_response("Internal server error")
                    }
                },
                "post": {
                    "summary": "Create a book owned by the caller",
                    "tags": ["Books"],
                    "security": bearer,
                    "requestBody": json_body("CreateBook"),
                    "responses": {
                        "200": json_response("Created book", book_ref()),
                        "400": error_response("Validation error"),
                        "401": error_response("Missing or invalid token"),
                        "500": error_response("Internal server error")
                    }
                }
            },
            "/cost": {
                "get": {
                    "summary": "Books costing at least 500 and under 1000, cheapest first",
                    "tags": ["Books"],
                    "parameters": [
                        { "name": "minCost", "in": "query", "required": true, "schema": { "type": "string" } },
                        { "name": "maxCost", "in": "query", "required": true, "schema": { "type": "string" } }
                    ],
                    "responses": {
                        "200": json_response("Books in the cost window", book_list()),
                        "400": error_response("Missing cost parameter"),
                        "500": error_response("Internal server error")
                    }
                }
            },
            "/{key}": {
                "get": {
                    "summary": "Find a book by id, or books by author fragment",
                    "tags": ["Books"],
                    "parameters": key_param,
                    "responses": {
                        "200": json_response(
                            "One book for an id, a list for an author fragment",
                            json!({ "oneOf": [book_ref(), book_list()] })
                        ),
                        "404": error_response("Book not found"),
                        "500": error_response("Internal server error")
                    }
                },
                "put": {
                    "summary": "Change the cost of a book the caller owns",
                    "tags": ["Books"],
                    "security": bearer,
                    "parameters": key_param,
                    "requestBody": json_body("UpdateBook"),
                    "responses": {
                        "200": json_response("Confirmation", json!({ "$ref": "#/components/schemas/Confirmation" })),
                        "400": error_response("Validation error"),
                        "401": error_response("Missing token or not the owner"),
                        "404": error_response("Book not found"),
                        "500": error_response("Internal server error")
                    }
                },
                "delete": {
                    "summary": "Delete a book the caller owns",
                    "tags": ["Books"],
                    "security": bearer,
                    "parameters": key_param,
                    "responses": {
                        "200": json_response("Confirmation", json!({ "$ref": "#/components/schemas/Confirmation" })),
                        "401": error_response("Missing token or not the owner"),
                        "404": error_response("Book not found"),
                        "500": error_response("Internal server error")
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
                        "id": { "type": "string", "description": "24 hex character identifier" },
                        "title": { "type": "string" },
                        "publication": { "type": "string" },
                        "author": { "type": "string" },
                        "category": { "type": "string" },
                        "avatar": { "type": "string" },
                        "publishedAt": { "type": "string", "format": "date-time" },
                        "createdAt": { "type": "string", "format": "date-time" },
                        "updatedAt": { "type": "string", "format": "date-time" },
                        "cost": { "type": "number" },
                        "isBestSeller": { "type": "boolean" },
                        "owner": { "type": "string", "description": "Identity that created the book" }
                    },
                    "required": ["id", "title", "publication", "author", "createdAt", "cost", "isBestSeller", "owner"]
                },
                "CreateBook": {
                    "type": "object",
                    "properties": {
                        "title": { "type": ["string", "number", "boolean"] },
                        "publication": { "type": ["string", "number", "boolean"] },
                        "author": { "type": ["string", "number", "boolean"] },
                        "cost": { "type": ["number", "string"] }
                    },
                    "required": ["title", "publication", "author"]
                },
                "UpdateBook": {
                    "type": "object",
                    "properties": {
                        "cost": { "type": ["number", "string"] }
                    },
                    "required": ["cost"]
                },
                "Confirmation": {
                    "type": "object",
                    "properties": { "msg": { "type": "string" } },
                    "required": ["msg"]
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_authz::JwtResolver;
    use quire_db::MemoryStore;
    use quire_kernel::settings::Settings;

    fn module() -> BooksModule {
        let settings = Settings::default();
        let identity: IdentityResolverArc = Arc::new(JwtResolver::new(&settings.auth).unwrap());
        BooksModule::new(Arc::new(MemoryStore::new()), identity)
    }

    #[test]
    fn openapi_fragment_documents_every_route() {
        let fragment = module().openapi().unwrap();
        let paths = fragment["paths"].as_object().unwrap();
        for path in ["/", "/cost", "/{key}", "/health"] {
            assert!(paths.contains_key(path), "missing {path}");
        }
        assert!(fragment["paths"]["/{key}"]["delete"].is_object());
        assert!(fragment["components"]["schemas"]["Book"].is_object());
    }

    #[tokio::test]
    async fn lifecycle_hooks_succeed() {
        let module = module();
        let settings = Settings::default();
        let ctx = InitCtx { settings: &settings };
        module.init(&ctx).await.unwrap();
        module.start(&ctx).await.unwrap();
        module.stop().await.unwrap();
    }
}
