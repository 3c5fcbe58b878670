//! Refund document access.

use std::sync::Arc;

use serde_json::{Map, Value};
use till::refunds::RefundRecord;

use crate::{
    refunds::records::{REFUNDS_COLLECTION, RefundUuid, StoredRefund},
    store::{DocumentStore, Filter, StoreError},
};

/// Typed access to the refund requests collection.
#[derive(Clone)]
pub(crate) struct RefundsRepository {
    store: Arc<dyn DocumentStore>,
}

impl RefundsRepository {
    pub(crate) fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Persist a new refund request under a freshly minted id.
    pub(crate) async fn create(&self, record: &RefundRecord) -> Result<RefundUuid, StoreError> {
        let uuid = RefundUuid::now_v7();
        let body = serde_json::to_value(record)?;

        self.store
            .create(REFUNDS_COLLECTION, uuid.into_uuid(), body)
            .await?;

        Ok(uuid)
    }

    pub(crate) async fn get(&self, uuid: RefundUuid) -> Result<StoredRefund, StoreError> {
        let document = self.store.get(REFUNDS_COLLECTION, uuid.into_uuid()).await?;

        StoredRefund::from_document(document)
    }

    /// Patch the decision fields only; the snapshot of the order is untouched.
    pub(crate) async fn store_resolution(
        &self,
        uuid: RefundUuid,
        record: &RefundRecord,
    ) -> Result<(), StoreError> {
        let mut patch = Map::new();
        patch.insert("status".to_owned(), serde_json::to_value(record.status)?);
        patch.insert("processed".to_owned(), Value::Bool(record.processed));

        self.store
            .update(REFUNDS_COLLECTION, uuid.into_uuid(), Value::Object(patch))
            .await
    }

    pub(crate) async fn list(&self) -> Result<Vec<StoredRefund>, StoreError> {
        let documents = self.store.query(REFUNDS_COLLECTION, Filter::All).await?;

        documents
            .into_iter()
            .map(StoredRefund::from_document)
            .collect()
    }
}
