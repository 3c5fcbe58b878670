//! Orders

pub mod directory;
pub mod records;
pub(crate) mod repository;
pub mod submission;

pub use directory::{LifecycleError, OrderDirectory};
pub use records::{OrderUuid, StoredOrder};
pub use submission::{OrderSubmissionService, SubmissionError};
