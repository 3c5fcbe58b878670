//! Refund requests.

use std::fmt;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{money::Amount, orders::OrderRecord};

/// Errors produced by refund resolution.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RefundError {
    /// The request has already been approved or rejected.
    #[error("refund request has already been processed")]
    AlreadyProcessed,
}

/// Where a refund request stands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefundStatus {
    /// Waiting for an operator decision.
    #[default]
    Pending,
    /// The money goes back to the buyer.
    Approved,
    /// The request was declined.
    Rejected,
}

impl RefundStatus {
    /// Whether an operator decision is still outstanding.
    #[must_use]
    pub const fn is_pending(self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Human-readable status label.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for RefundStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// An operator's decision on a refund request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefundResolution {
    /// Return the money.
    Approve,
    /// Decline the request.
    Reject,
}

/// A refund request raised when an order is cancelled.
///
/// The request snapshots everything it needs from the order at cancellation
/// time, so resolving it later never requires the order document to still
/// exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefundRecord {
    /// Store id of the cancelled order.
    pub order_uuid: Uuid,
    /// The order's display number, for operator screens.
    pub order_display_id: String,
    /// Buyer's account id.
    pub user_id: String,
    /// Buyer's name as it appeared on the order.
    pub user_name: String,
    /// Amount to return: the order's full `total_amount`.
    pub refund_amount: Amount,
    /// Current decision state.
    pub status: RefundStatus,
    /// Set once a decision has been recorded; guards against re-processing.
    pub processed: bool,
    /// When the cancellation was requested.
    pub requested_at: Timestamp,
}

impl RefundRecord {
    /// Raise a pending request for a cancelled order.
    ///
    /// The refund amount is the order's stored grand total.
    #[must_use]
    pub fn for_order(order_uuid: Uuid, order: &OrderRecord, requested_at: Timestamp) -> Self {
        Self {
            order_uuid,
            order_display_id: order.display_id.clone(),
            user_id: order.user_id.clone(),
            user_name: order.address.name.clone(),
            refund_amount: order.total_amount,
            status: RefundStatus::Pending,
            processed: false,
            requested_at,
        }
    }

    /// Record an operator decision.
    ///
    /// # Errors
    ///
    /// Returns [`RefundError::AlreadyProcessed`] if a decision has already
    /// been recorded; the stored decision is left untouched.
    pub fn resolve(&mut self, resolution: RefundResolution) -> Result<(), RefundError> {
        if self.processed {
            return Err(RefundError::AlreadyProcessed);
        }

        self.status = match resolution {
            RefundResolution::Approve => RefundStatus::Approved,
            RefundResolution::Reject => RefundStatus::Rejected,
        };
        self.processed = true;

        Ok(())
    }
}
