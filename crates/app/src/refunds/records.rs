//! Refund Records

use till::refunds::RefundRecord;

use crate::{
    store::{Document, StoreError},
    uuids::TypedUuid,
};

/// Refund request document id.
pub type RefundUuid = TypedUuid<RefundRecord>;

/// Collection refund requests are stored in.
pub(crate) const REFUNDS_COLLECTION: &str = "refund_requests";

/// A stored refund request: the document id plus the decoded record.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRefund {
    /// Document id.
    pub uuid: RefundUuid,
    /// The request as stored.
    pub record: RefundRecord,
}

impl StoredRefund {
    /// Decode a raw store document into a typed refund request.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Decode`] when the body is not a
    /// [`RefundRecord`].
    pub(crate) fn from_document(document: Document) -> Result<Self, StoreError> {
        Ok(Self {
            uuid: RefundUuid::from_uuid(document.id),
            record: serde_json::from_value(document.body)?,
        })
    }
}
