//! Document store for Quire: JSON documents grouped in named collections,
//! addressed by [`ObjectId`] and by field filters.

pub mod error;
pub mod id;
pub mod memory;
pub mod module;
pub mod query;

use std::{fmt::Debug, sync::Arc};

use async_trait::async_trait;

pub use error::{DbError, DbResult};
pub use id::ObjectId;
pub use memory::MemoryStore;
pub use module::{create_module, DbModule};
pub use query::{Filter, Query, SortOrder};

/// A stored document: a JSON object whose `id` field is assigned by the store.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Name of the field holding a document's identifier.
pub const ID_FIELD: &str = "id";

/// Persistent collection operations used by the application modules.
///
/// Every method touches at most one document and is atomic on its own.
#[async_trait]
pub trait DocumentStore: Debug {
    /// Inserts a document, assigning a fresh identifier.
    ///
    /// Returns the stored document including its `id`.
    async fn insert(&self, collection: &str, document: Document) -> DbResult<Document>;

    /// Returns every document of the collection matching `query`.
    async fn find(&self, collection: &str, query: &Query) -> DbResult<Vec<Document>>;

    /// Looks a document up by identifier.
    async fn find_by_id(&self, collection: &str, id: &ObjectId) -> DbResult<Option<Document>>;

    /// Merges `changes` into the top-level fields of a document.
    ///
    /// Returns `false` when no document has that identifier. The `id` field
    /// cannot be changed.
    async fn update_by_id(
        &self,
        collection: &str,
        id: &ObjectId,
        changes: Document,
    ) -> DbResult<bool>;

    /// Removes a document. Returns `false` when it did not exist.
    async fn delete_by_id(&self, collection: &str, id: &ObjectId) -> DbResult<bool>;

    /// Flushes pending state and refuses further operations.
    async fn close(&self) -> DbResult<()>;
}

/// Thread-safe shared reference to a document store.
pub type StoreHandle = Arc<dyn DocumentStore + Send + Sync>;
