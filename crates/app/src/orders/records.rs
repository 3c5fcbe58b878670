//! Order Records

use till::orders::OrderRecord;

use crate::{
    store::{Document, StoreError},
    uuids::TypedUuid,
};

/// Order document id.
pub type OrderUuid = TypedUuid<OrderRecord>;

/// Collection orders are stored in.
pub(crate) const ORDERS_COLLECTION: &str = "orders";

/// A stored order: the document id plus the decoded record.
///
/// The id is the order's real key. The record's `display_id` is a label and
/// may collide.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredOrder {
    /// Document id.
    pub uuid: OrderUuid,
    /// The order as stored.
    pub record: OrderRecord,
}

impl StoredOrder {
    /// Decode a raw store document into a typed order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Decode`] when the body is not an
    /// [`OrderRecord`].
    pub(crate) fn from_document(document: Document) -> Result<Self, StoreError> {
        Ok(Self {
            uuid: OrderUuid::from_uuid(document.id),
            record: serde_json::from_value(document.body)?,
        })
    }
}
