use std::{
    collections::{BTreeMap, HashMap},
    path::{Path, PathBuf},
    sync::atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::{DbError, DbResult, Document, DocumentStore, ObjectId, Query, ID_FIELD};

type Collection = BTreeMap<ObjectId, Document>;
type Collections = HashMap<String, Collection>;

/// Document store kept in memory, optionally written through to a JSON file.
///
/// The data file holds one array of documents per collection name. Writes
/// replace the file atomically (temporary file then rename) while the write
/// lock is held, so each single-document operation is durable once it
/// returns. A failed write is rolled back in memory before the error is
/// returned.
#[derive(Debug)]
pub struct MemoryStore {
    collections: RwLock<Collections>,
    path: Option<PathBuf>,
    closed: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Creates an empty store that is never persisted.
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            path: None,
            closed: AtomicBool::new(false),
        }
    }

    /// Opens a store backed by `path`, loading it when the file exists.
    pub async fn open(path: impl Into<PathBuf>) -> DbResult<Self> {
        let path = path.into();
        let collections = match tokio::fs::read(&path).await {
            Ok(bytes) => decode(&bytes)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(err) => return Err(err.into()),
        };

        tracing::info!(
            path = %path.display(),
            collections = collections.len(),
            "document store opened"
        );

        Ok(Self {
            collections: RwLock::new(collections),
            path: Some(path),
            closed: AtomicBool::new(false),
        })
    }

    /// Opens a file-backed store when `path` is set, an in-memory one otherwise.
    pub async fn open_optional(path: Option<&Path>) -> DbResult<Self> {
        match path {
            Some(path) => Self::open(path).await,
            None => {
                tracing::info!("document store opened in memory");
                Ok(Self::new())
            }
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn ensure_open(&self) -> DbResult<()> {
        if self.closed.load(Ordering::Acquire) {
            Err(DbError::Closed)
        } else {
            Ok(())
        }
    }

    async fn persist(&self, collections: &Collections) -> DbResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let snapshot: BTreeMap<&str, Vec<&Document>> = collections
            .iter()
            .map(|(name, documents)| (name.as_str(), documents.values().collect()))
            .collect();
        let bytes = serde_json::to_vec_pretty(&snapshot)?;

        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let temp_path = path.with_extension("tmp");
        tokio::fs::write(&temp_path, bytes).await?;
        tokio::fs::rename(&temp_path, path).await?;

        tracing::trace!(path = %path.display(), "document store flushed");
        Ok(())
    }
}

fn decode(bytes: &[u8]) -> DbResult<Collections> {
    let raw: HashMap<String, Vec<Document>> = serde_json::from_slice(bytes)?;

    raw.into_iter()
        .map(|(name, documents)| {
            let collection = documents
                .into_iter()
                .map(|document| {
                    let id = document
                        .get(ID_FIELD)
                        .and_then(Value::as_str)
                        .ok_or_else(|| {
                            DbError::Corrupt(format!("document in '{name}' has no id"))
                        })
                        .and_then(ObjectId::parse_str)?;
                    Ok((id, document))
                })
                .collect::<DbResult<Collection>>()?;
            Ok((name, collection))
        })
        .collect()
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(&self, collection: &str, mut document: Document) -> DbResult<Document> {
        self.ensure_open()?;
        let id = ObjectId::new();
        document.insert(ID_FIELD.to_string(), Value::String(id.to_string()));

        let mut collections = self.collections.write().await;
        let created = !collections.contains_key(collection);
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id, document.clone());

        if let Err(err) = self.persist(&collections).await {
            if created {
                collections.remove(collection);
            } else if let Some(documents) = collections.get_mut(collection) {
                documents.remove(&id);
            }
            return Err(err);
        }

        tracing::debug!(collection, %id, "document inserted");
        Ok(document)
    }

    async fn find(&self, collection: &str, query: &Query) -> DbResult<Vec<Document>> {
        self.ensure_open()?;
        let collections = self.collections.read().await;

        let mut documents: Vec<Document> = collections
            .get(collection)
            .map(|documents| {
                documents
                    .values()
                    .filter(|document| query.filter.matches(document))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        query.sort_documents(&mut documents);

        Ok(documents)
    }

    async fn find_by_id(&self, collection: &str, id: &ObjectId) -> DbResult<Option<Document>> {
        self.ensure_open()?;
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|documents| documents.get(id))
            .cloned())
    }

    async fn update_by_id(
        &self,
        collection: &str,
        id: &ObjectId,
        changes: Document,
    ) -> DbResult<bool> {
        self.ensure_open()?;
        let mut collections = self.collections.write().await;

        let Some(document) = collections
            .get_mut(collection)
            .and_then(|documents| documents.get_mut(id))
        else {
            return Ok(false);
        };

        let previous = document.clone();
        for (field, value) in changes {
            if field != ID_FIELD {
                document.insert(field, value);
            }
        }

        if let Err(err) = self.persist(&collections).await {
            if let Some(documents) = collections.get_mut(collection) {
                documents.insert(*id, previous);
            }
            return Err(err);
        }

        tracing::debug!(collection, %id, "document updated");
        Ok(true)
    }

    async fn delete_by_id(&self, collection: &str, id: &ObjectId) -> DbResult<bool> {
        self.ensure_open()?;
        let mut collections = self.collections.write().await;

        let Some(removed) = collections
            .get_mut(collection)
            .and_then(|documents| documents.remove(id))
        else {
            return Ok(false);
        };

        if let Err(err) = self.persist(&collections).await {
            if let Some(documents) = collections.get_mut(collection) {
                documents.insert(*id, removed);
            }
            return Err(err);
        }

        tracing::debug!(collection, %id, "document deleted");
        Ok(true)
    }

    async fn close(&self) -> DbResult<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        let collections = self.collections.write().await;
        self.persist(&collections).await?;
        tracing::info!("document store closed");
        Ok(())
    }
}
