//! Refunds

pub mod records;
pub(crate) mod repository;
pub mod workflow;

pub use records::{RefundUuid, StoredRefund};
pub use workflow::{RefundWorkflow, RefundWorkflowError};
