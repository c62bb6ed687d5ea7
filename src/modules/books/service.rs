use anyhow::Context;
use quire_authz::Caller;
use quire_db::{Document, Filter, ObjectId, Query, SortOrder, StoreHandle, ID_FIELD};
use serde_json::Value;
use time::OffsetDateTime;

use super::{
    error::BookError,
    models::{Book, Confirmation, CostRange, CreateBook, NewBook, UpdateBook, COLLECTION},
    validation,
};

/// Inclusive lower bound of the cost window served by `find_by_cost_range`.
pub const COST_WINDOW_FLOOR: f64 = 500.0;
/// Exclusive upper bound of the cost window served by `find_by_cost_range`.
pub const COST_WINDOW_CEILING: f64 = 1000.0;

pub const UPDATED_MESSAGE: &str = "Successfully updated book.";
pub const DELETED_MESSAGE: &str = "Successfully deleted book.";

/// Book operations: authentication-gated writes, ownership checks, and
/// filtered reads over the `books` collection.
#[derive(Debug, Clone)]
pub struct BookService {
    store: StoreHandle,
}

impl BookService {
    pub fn new(store: StoreHandle) -> Self {
        Self { store }
    }

    /// Validates and stores a new book owned by `caller`.
    pub async fn create(
        &self,
        caller: Option<&Caller>,
        request: CreateBook,
    ) -> Result<Book, BookError> {
        let caller = caller.ok_or(BookError::Unauthenticated)?;
        let valid = validation::validate_create(&request).map_err(BookError::Validation)?;

        let new_book = NewBook {
            title: valid.title,
            publication: valid.publication,
            author: valid.author,
            created_at: OffsetDateTime::now_utc(),
            cost: valid.cost,
            is_best_seller: true,
            owner: caller.id,
        };
        let document = to_document(&new_book)?;

        let stored = self.store.insert(COLLECTION, document).await?;
        let book = decode(stored)?;

        tracing::info!(book_id = %book.id, owner = %book.owner, "book created");
        Ok(book)
    }

    /// Every book, newest first.
    pub async fn list_all(&self) -> Result<Vec<Book>, BookError> {
        let query = Query::all().sort_by(ID_FIELD, SortOrder::Descending);
        self.find(&query).await
    }

    /// Books whose author contains `author`, ignoring case.
    pub async fn find_by_author(&self, author: &str) -> Result<Vec<Book>, BookError> {
        let query = Query::filter(Filter::contains_ignore_case("author", author)?);
        self.find(&query).await
    }

    /// Books with `500 <= cost < 1000`, cheapest first.
    ///
    /// Both bounds must be supplied but the window is fixed; the supplied
    /// values do not narrow or widen it.
    pub async fn find_by_cost_range(&self, range: &CostRange) -> Result<Vec<Book>, BookError> {
        validation::validate_cost_range(range).map_err(BookError::Validation)?;
        tracing::debug!(
            min_cost = ?range.min_cost,
            max_cost = ?range.max_cost,
            "cost range requested"
        );

        let query = Query::filter(Filter::range(
            "cost",
            Some(COST_WINDOW_FLOOR),
            Some(COST_WINDOW_CEILING),
        ))
        .sort_by("cost", SortOrder::Ascending);
        self.find(&query).await
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Book, BookError> {
        let id = ObjectId::parse_str(id)?;
        self.load(id).await
    }

    /// Changes the cost of a book owned by `caller`. No other field moves.
    pub async fn update(
        &self,
        caller: Option<&Caller>,
        id: &str,
        request: UpdateBook,
    ) -> Result<Confirmation, BookError> {
        let caller = caller.ok_or(BookError::Unauthenticated)?;
        let cost = validation::validate_update(&request).map_err(BookError::Validation)?;
        let book = self.load_owned(caller, id).await?;

        let mut changes = Document::new();
        changes.insert("cost".to_string(), Value::from(cost));
        if !self.store.update_by_id(COLLECTION, &book.id, changes).await? {
            return Err(BookError::NotFound(book.id));
        }

        tracing::info!(book_id = %book.id, cost, "book cost updated");
        Ok(Confirmation::new(UPDATED_MESSAGE))
    }

    /// Deletes a book owned by `caller`.
    pub async fn remove(&self, caller: Option<&Caller>, id: &str) -> Result<Confirmation, BookError> {
        let caller = caller.ok_or(BookError::Unauthenticated)?;
        let book = self.load_owned(caller, id).await?;

        if !self.store.delete_by_id(COLLECTION, &book.id).await? {
            return Err(BookError::NotFound(book.id));
        }

        tracing::info!(book_id = %book.id, "book deleted");
        Ok(Confirmation::new(DELETED_MESSAGE))
    }

    async fn find(&self, query: &Query) -> Result<Vec<Book>, BookError> {
        self.store
            .find(COLLECTION, query)
            .await?
            .into_iter()
            .map(decode)
            .collect()
    }

    async fn load(&self, id: ObjectId) -> Result<Book, BookError> {
        let document = self
            .store
            .find_by_id(COLLECTION, &id)
            .await?
            .ok_or(BookError::NotFound(id))?;
        decode(document)
    }

    async fn load_owned(&self, caller: &Caller, id: &str) -> Result<Book, BookError> {
        let book = self.find_by_id(id).await?;
        if book.owner != caller.id {
            tracing::warn!(book_id = %book.id, caller = %caller.id, "rejected change by non-owner");
            return Err(BookError::Forbidden {
                book: book.id,
                caller: caller.id,
            });
        }
        Ok(book)
    }
}

fn to_document(book: &NewBook) -> Result<Document, BookError> {
    match serde_json::to_value(book).context("failed to encode book")? {
        Value::Object(document) => Ok(document),
        other => Err(BookError::Internal(anyhow::anyhow!(
            "book encoded as non-object: {other}"
        ))),
    }
}

fn decode(document: Document) -> Result<Book, BookError> {
    let book = serde_json::from_value(Value::Object(document))
        .context("stored book document is unreadable")?;
    Ok(book)
}
