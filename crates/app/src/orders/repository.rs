//! Order document access.

use std::sync::Arc;

use serde_json::{Map, Value};
use till::orders::{OrderRecord, OrderStatus};

use crate::{
    orders::records::{ORDERS_COLLECTION, OrderUuid, StoredOrder},
    store::{DocumentStore, Filter, StoreError},
};

/// Typed access to the orders collection.
#[derive(Clone)]
pub(crate) struct OrdersRepository {
    store: Arc<dyn DocumentStore>,
}

impl OrdersRepository {
    pub(crate) fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Persist a new order under a freshly minted id.
    pub(crate) async fn create(&self, record: &OrderRecord) -> Result<OrderUuid, StoreError> {
        let uuid = OrderUuid::now_v7();
        let body = serde_json::to_value(record)?;

        self.store
            .create(ORDERS_COLLECTION, uuid.into_uuid(), body)
            .await?;

        Ok(uuid)
    }

    pub(crate) async fn get(&self, uuid: OrderUuid) -> Result<StoredOrder, StoreError> {
        let document = self.store.get(ORDERS_COLLECTION, uuid.into_uuid()).await?;

        StoredOrder::from_document(document)
    }

    /// Patch the status field only; every other stored field is untouched.
    pub(crate) async fn set_status(
        &self,
        uuid: OrderUuid,
        status: OrderStatus,
    ) -> Result<(), StoreError> {
        let mut patch = Map::new();
        patch.insert("status".to_owned(), serde_json::to_value(status)?);

        self.store
            .update(ORDERS_COLLECTION, uuid.into_uuid(), Value::Object(patch))
            .await
    }

    pub(crate) async fn list(&self) -> Result<Vec<StoredOrder>, StoreError> {
        let documents = self.store.query(ORDERS_COLLECTION, Filter::All).await?;

        documents
            .into_iter()
            .map(StoredOrder::from_document)
            .collect()
    }

    pub(crate) async fn list_for_user(&self, user_id: &str) -> Result<Vec<StoredOrder>, StoreError> {
        let documents = self
            .store
            .query(ORDERS_COLLECTION, Filter::field_eq("user_id", user_id))
            .await?;

        documents
            .into_iter()
            .map(StoredOrder::from_document)
            .collect()
    }
}
