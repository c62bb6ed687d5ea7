use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use quire_authz::{IdentityResolverArc, JwtResolver};
use quire_db::{MemoryStore, ObjectId};
use quire_kernel::settings::Settings;
use serde_json::{json, Value};
use tower::ServiceExt;

struct TestApp {
    router: Router,
    tokens: JwtResolver,
}

impl TestApp {
    fn new() -> Self {
        let settings = Settings::default();
        let identity: IdentityResolverArc = Arc::new(JwtResolver::new(&settings.auth).unwrap());
        let registry = quire_app::build_registry(Arc::new(MemoryStore::new()), identity);
        Self {
            router: quire_http::build_router(&registry, &settings),
            tokens: JwtResolver::new(&settings.auth).unwrap(),
        }
    }

    fn token(&self, user: ObjectId) -> String {
        self.tokens.issue(user).unwrap()
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(body) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(body.to_string())
            }
            None => Body::empty(),
        };
        self.call(request.body(body).unwrap()).await
    }

    async fn call(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn create(&self, token: &str, body: Value) -> Value {
        let (status, book) = self
            .send(Method::POST, "/api/books", Some(token), Some(body))
            .await;
        assert_eq!(status, StatusCode::OK, "create failed: {book}");
        book
    }
}

fn hobbit() -> Value {
    json!({
        "title": "The Hobbit",
        "publication": "Allen & Unwin",
        "author": "J.R.R. Tolkien",
        "cost": 750
    })
}

#[tokio::test]
async fn create_requires_a_valid_token() {
    let app = TestApp::new();

    let (status, body) = app
        .send(Method::POST, "/api/books", None, Some(hobbit()))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "unauthorized");
    assert_eq!(body["error"]["message"], "No token, authorization denied");

    let (status, _) = app
        .send(Method::POST, "/api/books", Some("not.a.jwt"), Some(hobbit()))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, books) = app.send(Method::GET, "/api/books", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(books, json!([]));
}

#[tokio::test]
async fn create_records_the_caller_as_owner() {
    let app = TestApp::new();
    let user = ObjectId::new();

    let book = app.create(&app.token(user), hobbit()).await;
    assert_eq!(book["owner"], json!(user.to_string()));
    assert_eq!(book["title"], "The Hobbit");
    assert_eq!(book["cost"], json!(750.0));
    assert_eq!(book["isBestSeller"], json!(true));
    assert!(ObjectId::is_valid(book["id"].as_str().unwrap()));
}

#[tokio::test]
async fn legacy_token_header_is_accepted() {
    let app = TestApp::new();
    let user = ObjectId::new();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/books")
        .header("x-auth-token", app.token(user))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(hobbit().to_string()))
        .unwrap();
    let (status, book) = app.call(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(book["owner"], json!(user.to_string()));
}

#[tokio::test]
async fn validation_errors_list_every_empty_field() {
    let app = TestApp::new();
    let token = app.token(ObjectId::new());

    let (status, body) = app
        .send(
            Method::POST,
            "/api/books",
            Some(&token),
            Some(json!({ "title": "", "publication": "Penguin" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "validation_error");
    let fields: Vec<_> = body["error"]["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|detail| detail["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["title", "author"]);

    let (_, books) = app.send(Method::GET, "/api/books", None, None).await;
    assert_eq!(books, json!([]));
}

#[tokio::test]
async fn scalar_text_fields_are_stored_as_strings() {
    let app = TestApp::new();
    let token = app.token(ObjectId::new());

    let book = app
        .create(
            &token,
            json!({ "title": 1984, "publication": "Secker & Warburg", "author": "George Orwell" }),
        )
        .await;
    assert_eq!(book["title"], "1984");
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let app = TestApp::new();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/books")
        .header(header::AUTHORIZATION, format!("Bearer {}", app.token(ObjectId::new())))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"title\": "))
        .unwrap();

    let (status, body) = app.call(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "bad_request");
}

#[tokio::test]
async fn list_is_newest_first() {
    let app = TestApp::new();
    let token = app.token(ObjectId::new());
    for title in ["one", "two", "three"] {
        app.create(
            &token,
            json!({ "title": title, "publication": "p", "author": "a" }),
        )
        .await;
    }

    let (status, books) = app.send(Method::GET, "/api/books", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<_> = books
        .as_array()
        .unwrap()
        .iter()
        .map(|book| book["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["three", "two", "one"]);
}

#[tokio::test]
async fn cost_route_serves_the_fixed_window() {
    let app = TestApp::new();
    let token = app.token(ObjectId::new());
    for cost in [1200, 500, 20, 999, 640] {
        app.create(
            &token,
            json!({ "title": "t", "publication": "p", "author": "a", "cost": cost }),
        )
        .await;
    }

    let (status, books) = app
        .send(Method::GET, "/api/books/cost?minCost=1&maxCost=5", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let costs: Vec<_> = books
        .as_array()
        .unwrap()
        .iter()
        .map(|book| book["cost"].as_f64().unwrap())
        .collect();
    assert_eq!(costs, vec![500.0, 640.0, 999.0]);

    let (status, body) = app
        .send(Method::GET, "/api/books/cost?minCost=1", None, None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["details"][0]["field"], "maxCost");
}

#[tokio::test]
async fn key_route_finds_by_id_or_author() {
    let app = TestApp::new();
    let token = app.token(ObjectId::new());
    let hobbit = app.create(&token, hobbit()).await;
    app.create(
        &token,
        json!({ "title": "Earthsea", "publication": "Parnassus", "author": "Ursula K. Le Guin" }),
    )
    .await;

    let id = hobbit["id"].as_str().unwrap();
    let (status, found) = app
        .send(Method::GET, &format!("/api/books/{id}"), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found, hobbit);

    let (status, found) = app.send(Method::GET, "/api/books/tolk", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found.as_array().unwrap().len(), 1);
    assert_eq!(found[0]["author"], "J.R.R. Tolkien");

    let (status, found) = app
        .send(Method::GET, "/api/books/pratchett", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found, json!([]));

    let missing = ObjectId::new();
    let (status, body) = app
        .send(Method::GET, &format!("/api/books/{missing}"), None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "Book Not Found.");
}

#[tokio::test]
async fn only_the_owner_may_update() {
    let app = TestApp::new();
    let owner = app.token(ObjectId::new());
    let stranger = app.token(ObjectId::new());
    let book = app.create(&owner, hobbit()).await;
    let uri = format!("/api/books/{}", book["id"].as_str().unwrap());

    let (status, body) = app
        .send(Method::PUT, &uri, Some(&stranger), Some(json!({ "cost": 1 })))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "forbidden");
    assert_eq!(body["error"]["message"], "User Not Authorized.");

    let (status, body) = app
        .send(Method::PUT, &uri, Some(&owner), Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["details"][0]["field"], "cost");

    let (status, body) = app
        .send(Method::PUT, &uri, Some(&owner), Some(json!({ "cost": "899" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "msg": "Successfully updated book." }));

    let (_, updated) = app.send(Method::GET, &uri, None, None).await;
    let mut expected = book.clone();
    expected["cost"] = json!(899.0);
    assert_eq!(updated, expected);

    let (status, _) = app
        .send(
            Method::PUT,
            "/api/books/not-an-id",
            Some(&owner),
            Some(json!({ "cost": 1 })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn only_the_owner_may_delete() {
    let app = TestApp::new();
    let owner = app.token(ObjectId::new());
    let book = app.create(&owner, hobbit()).await;
    let uri = format!("/api/books/{}", book["id"].as_str().unwrap());

    let (status, _) = app.send(Method::DELETE, &uri, None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let stranger = app.token(ObjectId::new());
    let (status, body) = app.send(Method::DELETE, &uri, Some(&stranger), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "forbidden");

    let (status, body) = app.send(Method::DELETE, &uri, Some(&owner), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "msg": "Successfully deleted book." }));

    let (status, _) = app.send(Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.send(Method::DELETE, &uri, Some(&owner), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .send(Method::DELETE, "/api/books/not-an-id", Some(&owner), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "Book Not Found.");
}

#[tokio::test]
async fn cost_route_rejects_writes() {
    let app = TestApp::new();
    let token = app.token(ObjectId::new());
    let (status, _) = app
        .send(Method::DELETE, "/api/books/cost", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn openapi_document_lists_book_routes() {
    let app = TestApp::new();
    let (status, spec) = app
        .send(Method::GET, "/docs/openapi.json", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    for path in ["/api/books", "/api/books/cost", "/api/books/{key}"] {
        assert!(spec["paths"][path].is_object(), "missing {path}");
    }
}

#[tokio::test]
async fn health_route_wins_over_author_lookup() {
    let app = TestApp::new();
    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/books/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"books module is healthy");
}
