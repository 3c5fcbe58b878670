//! The document store seam.

use async_trait::async_trait;
use mockall::automock;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by document store implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No document with this id exists in the collection.
    #[error("document {id} not found in {collection}")]
    NotFound {
        /// Collection that was searched.
        collection: String,
        /// Id that was looked up.
        id: Uuid,
    },

    /// A document with this id already exists in the collection.
    #[error("document {id} already exists in {collection}")]
    AlreadyExists {
        /// Collection that was written to.
        collection: String,
        /// Id that collided.
        id: Uuid,
    },

    /// The backend could not be reached or refused the operation.
    #[error("document store unavailable: {reason}")]
    Unavailable {
        /// Backend-specific explanation.
        reason: String,
    },

    /// A stored document did not decode as the expected record type.
    #[error("stored document could not be decoded")]
    Decode(#[from] serde_json::Error),
}

/// A stored document: its id plus the raw record body.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Store-assigned identity, unique within the collection.
    pub id: Uuid,
    /// The record as stored.
    pub body: Value,
}

/// Which documents a [`DocumentStore::query`] returns.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Every document in the collection.
    All,
    /// Documents whose top-level `field` equals `value`.
    FieldEq(String, Value),
}

impl Filter {
    /// Convenience constructor for string-equality filters.
    #[must_use]
    pub fn field_eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::FieldEq(field.into(), value.into())
    }
}

/// Schemaless document persistence, one JSON body per id.
///
/// This is the only way services touch storage. Updates merge the patch's
/// top-level fields into the stored body and replace nothing else; there is
/// no versioning, so two concurrent patches resolve to whichever lands last.
#[automock]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a new document under `id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AlreadyExists`] when the id is taken.
    async fn create(&self, collection: &str, id: Uuid, body: Value) -> Result<(), StoreError>;

    /// Fetch a document by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when no document matches.
    async fn get(&self, collection: &str, id: Uuid) -> Result<Document, StoreError>;

    /// Merge `patch`'s top-level fields into the stored document.
    ///
    /// Fields absent from `patch` keep their stored values.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when no document matches.
    async fn update(&self, collection: &str, id: Uuid, patch: Value) -> Result<(), StoreError>;

    /// Fetch every document matching `filter`, in no particular order.
    ///
    /// An unknown collection is empty, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] when the backend cannot answer.
    async fn query(&self, collection: &str, filter: Filter) -> Result<Vec<Document>, StoreError>;

    /// Remove a document.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when no document matches.
    async fn delete(&self, collection: &str, id: Uuid) -> Result<(), StoreError>;
}
