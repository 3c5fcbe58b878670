//! In-memory document store.

use async_trait::async_trait;
use rustc_hash::FxHashMap;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::store::{Document, DocumentStore, Filter, StoreError};

/// A [`DocumentStore`] held entirely in process memory.
///
/// Used by tests and examples, and useful as a reference for the merge
/// semantics a real backend must provide. Collections spring into existence
/// on first write.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<FxHashMap<String, FxHashMap<Uuid, Value>>>,
}

impl MemoryDocumentStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently in a collection.
    pub async fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, FxHashMap::len)
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn create(&self, collection: &str, id: Uuid, body: Value) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        let documents = collections.entry(collection.to_owned()).or_default();

        if documents.contains_key(&id) {
            return Err(StoreError::AlreadyExists {
                collection: collection.to_owned(),
                id,
            });
        }

        documents.insert(id, body);

        Ok(())
    }

    async fn get(&self, collection: &str, id: Uuid) -> Result<Document, StoreError> {
        self.collections
            .read()
            .await
            .get(collection)
            .and_then(|documents| documents.get(&id))
            .map(|body| Document {
                id,
                body: body.clone(),
            })
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_owned(),
                id,
            })
    }

    async fn update(&self, collection: &str, id: Uuid, patch: Value) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        let stored = collections
            .get_mut(collection)
            .and_then(|documents| documents.get_mut(&id))
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_owned(),
                id,
            })?;

        match (stored.as_object_mut(), patch) {
            (Some(fields), Value::Object(updates)) => {
                fields.extend(updates);
            }
            // Non-object bodies have no fields to merge into.
            (_, patch) => *stored = patch,
        }

        Ok(())
    }

    async fn query(&self, collection: &str, filter: Filter) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read().await;
        let Some(documents) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let matches = documents
            .iter()
            .filter(|(_, body)| match &filter {
                Filter::All => true,
                Filter::FieldEq(field, value) => body.get(field) == Some(value),
            })
            .map(|(&id, body)| Document {
                id,
                body: body.clone(),
            })
            .collect();

        Ok(matches)
    }

    async fn delete(&self, collection: &str, id: Uuid) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        let removed = collections
            .get_mut(collection)
            .and_then(|documents| documents.remove(&id));

        if removed.is_none() {
            return Err(StoreError::NotFound {
                collection: collection.to_owned(),
                id,
            });
        }

        Ok(())
    }
}
