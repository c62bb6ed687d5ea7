//! HTTP handlers for `/api/books`.

use axum::{
    extract::{rejection::JsonRejection, FromRef, Path, Query, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use quire_authz::{Caller, IdentityResolverArc};
use quire_db::ObjectId;
use quire_http::error::AppError;

use super::{
    models::{Book, Confirmation, CostRange, CreateBook, UpdateBook},
    service::BookService,
};

/// State shared by the book handlers.
#[derive(Clone)]
pub struct BooksState {
    pub service: BookService,
    pub identity: IdentityResolverArc,
}

impl FromRef<BooksState> for IdentityResolverArc {
    fn from_ref(state: &BooksState) -> Self {
        state.identity.clone()
    }
}

/// `/cost` is static and wins over `/{key}`.
pub fn router(state: BooksState) -> Router {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route("/health", get(health_check))
        .route("/cost", get(books_by_cost))
        .route(
            "/{key}",
            get(find_by_key).put(update_book).delete(delete_book),
        )
        .with_state(state)
}

async fn health_check() -> &'static str {
    "books module is healthy"
}

async fn list_books(State(state): State<BooksState>) -> Result<Json<Vec<Book>>, AppError> {
    Ok(Json(state.service.list_all().await?))
}

async fn create_book(
    State(state): State<BooksState>,
    caller: Option<Caller>,
    body: Result<Json<CreateBook>, JsonRejection>,
) -> Result<Json<Book>, AppError> {
    let caller = require_caller(caller)?;
    let Json(request) = body.map_err(bad_body)?;
    Ok(Json(state.service.create(Some(&caller), request).await?))
}

async fn books_by_cost(
    State(state): State<BooksState>,
    Query(range): Query<CostRange>,
) -> Result<Json<Vec<Book>>, AppError> {
    Ok(Json(state.service.find_by_cost_range(&range).await?))
}

/// A well-formed identifier is looked up by id; anything else is an author
/// fragment.
async fn find_by_key(
    State(state): State<BooksState>,
    Path(key): Path<String>,
) -> Result<Response, AppError> {
    if ObjectId::is_valid(&key) {
        let book = state.service.find_by_id(&key).await?;
        Ok(Json(book).into_response())
    } else {
        let books = state.service.find_by_author(&key).await?;
        Ok(Json(books).into_response())
    }
}

async fn update_book(
    State(state): State<BooksState>,
    caller: Option<Caller>,
    Path(id): Path<String>,
    body: Result<Json<UpdateBook>, JsonRejection>,
) -> Result<Json<Confirmation>, AppError> {
    let caller = require_caller(caller)?;
    let Json(request) = body.map_err(bad_body)?;
    Ok(Json(state.service.update(Some(&caller), &id, request).await?))
}

async fn delete_book(
    State(state): State<BooksState>,
    caller: Option<Caller>,
    Path(id): Path<String>,
) -> Result<Json<Confirmation>, AppError> {
    Ok(Json(state.service.remove(caller.as_ref(), &id).await?))
}

/// Authentication is checked before the body is decoded.
fn require_caller(caller: Option<Caller>) -> Result<Caller, AppError> {
    caller.ok_or_else(|| super::error::BookError::Unauthenticated.into())
}

fn bad_body(rejection: JsonRejection) -> AppError {
    tracing::debug!(error = %rejection, "rejected request body");
    AppError::bad_request(rejection.body_text())
}
