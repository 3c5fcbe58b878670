//! Order records and the fulfilment status machine.

use std::fmt;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{address::AddressInfo, cart::CartLine, checkout::OrderDraft, money::Amount};

/// Payment identifier recorded for cash-on-delivery orders, which never
/// touch the gateway.
pub const COD_PAYMENT_ID: &str = "COD";

/// Errors produced by status transitions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    /// Terminal statuses accept no further transitions.
    #[error("order is already {status} and cannot change")]
    Terminal {
        /// The terminal status the order is in.
        status: OrderStatus,
    },

    /// The requested move skips or reverses the fulfilment path.
    #[error("an order cannot move from {from} to {to}")]
    Illegal {
        /// Status the order is currently in.
        from: OrderStatus,
        /// Status that was requested.
        to: OrderStatus,
    },
}

/// Fulfilment status of an order.
///
/// Orders move strictly forward: `Processing` to `Shipped` to `Delivered`.
/// Cancellation is reachable from any non-terminal status. `Delivered` and
/// `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Accepted and being prepared.
    #[default]
    Processing,
    /// Handed to the courier.
    Shipped,
    /// Received by the buyer. Terminal.
    Delivered,
    /// Called off before delivery. Terminal.
    Cancelled,
}

impl OrderStatus {
    /// Whether the status accepts no further transitions.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Whether an order in this status may still be cancelled.
    #[must_use]
    pub const fn is_cancellable(self) -> bool {
        !self.is_terminal()
    }

    /// Whether moving to `next` is on the fulfilment path.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Processing, Self::Shipped)
                | (Self::Shipped, Self::Delivered)
                | (Self::Processing | Self::Shipped, Self::Cancelled)
        )
    }

    /// Move to `next`, or explain why the move is not allowed.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::Terminal`] when the current status is
    /// terminal, and [`TransitionError::Illegal`] for any other move off the
    /// fulfilment path.
    pub fn transition_to(self, next: Self) -> Result<Self, TransitionError> {
        if self.is_terminal() {
            return Err(TransitionError::Terminal { status: self });
        }

        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(TransitionError::Illegal {
                from: self,
                to: next,
            })
        }
    }

    /// Human-readable status label.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Processing => "Processing",
            Self::Shipped => "Shipped",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// How the buyer pays for an order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    /// Hosted checkout through the payment gateway.
    #[default]
    OnlineGateway,
    /// Cash collected by the courier on delivery.
    CashOnDelivery,
}

impl PaymentMethod {
    /// Whether this is cash on delivery.
    #[must_use]
    pub const fn is_cash_on_delivery(self) -> bool {
        matches!(self, Self::CashOnDelivery)
    }

    /// Human-readable method label.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::OnlineGateway => "Online payment",
            Self::CashOnDelivery => "Cash on delivery",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A placed order, exactly as persisted.
///
/// Everything a buyer confirmed at review time is frozen here: the cart
/// lines, the address, and the totals. Later catalog or rate changes never
/// alter a stored order. `total_amount` is the authoritative grand total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    /// Short order number shown to buyers and on invoices.
    ///
    /// Derived from the placement time and not guaranteed unique; the store
    /// document id is the real key.
    pub display_id: String,
    /// Cart lines as they stood at confirmation.
    pub cart_items: Vec<CartLine>,
    /// Delivery address.
    pub address: AddressInfo,
    /// Buyer's email.
    pub email: String,
    /// Buyer's account id.
    pub user_id: String,
    /// Shipping surcharge included in the total.
    pub shipping_charges: Amount,
    /// Authoritative grand total (items plus shipping).
    pub total_amount: Amount,
    /// Gateway transaction reference, or [`COD_PAYMENT_ID`].
    pub payment_id: String,
    /// How the order is paid.
    pub payment_method: PaymentMethod,
    /// Current fulfilment status.
    pub status: OrderStatus,
    /// Placement date formatted for display, e.g. `Aug 21, 2026`.
    pub date: String,
    /// Placement instant, used for sorting.
    pub placed_at: Timestamp,
}

impl OrderRecord {
    /// Freeze a reviewed draft into a persistable record.
    ///
    /// The record starts in [`OrderStatus::Processing`].
    #[must_use]
    pub fn from_draft(
        draft: OrderDraft,
        email: impl Into<String>,
        user_id: impl Into<String>,
        payment_id: impl Into<String>,
        placed_at: Timestamp,
    ) -> Self {
        Self {
            display_id: Self::display_id_at(placed_at),
            cart_items: draft.lines,
            address: draft.address,
            email: email.into(),
            user_id: user_id.into(),
            shipping_charges: draft.shipping,
            total_amount: draft.grand_total,
            payment_id: payment_id.into(),
            payment_method: draft.payment_method,
            status: OrderStatus::Processing,
            date: placed_at.strftime("%b %d, %Y").to_string(),
            placed_at,
        }
    }

    /// The order number minted for an order placed at `timestamp`: the last
    /// eight digits of the epoch-millisecond count.
    ///
    /// Two orders placed in the same millisecond share a number, and the
    /// eight-digit window repeats roughly daily. This is a display label
    /// only; nothing may key on it.
    #[must_use]
    pub fn display_id_at(timestamp: Timestamp) -> String {
        let millis = timestamp.as_millisecond().unsigned_abs().to_string();
        let start = millis.len().saturating_sub(8);

        millis.get(start..).unwrap_or(millis.as_str()).to_owned()
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn processing_ships_then_delivers() -> TestResult {
        let status = OrderStatus::Processing.transition_to(OrderStatus::Shipped)?;
        let status = status.transition_to(OrderStatus::Delivered)?;

        assert_eq!(status, OrderStatus::Delivered, "expected the full path");
        Ok(())
    }

    #[test]
    fn processing_can_be_cancelled() -> TestResult {
        let status = OrderStatus::Processing.transition_to(OrderStatus::Cancelled)?;
        assert_eq!(status, OrderStatus::Cancelled, "expected cancellation");
        Ok(())
    }

    #[test]
    fn shipped_can_be_cancelled() -> TestResult {
        let status = OrderStatus::Shipped.transition_to(OrderStatus::Cancelled)?;
        assert_eq!(status, OrderStatus::Cancelled, "expected cancellation");
        Ok(())
    }

    #[test]
    fn processing_cannot_skip_to_delivered() {
        let result = OrderStatus::Processing.transition_to(OrderStatus::Delivered);

        assert_eq!(
            result,
            Err(TransitionError::Illegal {
                from: OrderStatus::Processing,
                to: OrderStatus::Delivered,
            }),
            "the shipped step must not be skipped"
        );
    }

    #[test]
    fn shipped_cannot_move_back_to_processing() {
        let result = OrderStatus::Shipped.transition_to(OrderStatus::Processing);

        assert!(
            matches!(result, Err(TransitionError::Illegal { .. })),
            "expected an illegal move, got {result:?}"
        );
    }

    #[test]
    fn delivered_is_terminal() {
        let result = OrderStatus::Delivered.transition_to(OrderStatus::Cancelled);

        assert_eq!(
            result,
            Err(TransitionError::Terminal {
                status: OrderStatus::Delivered,
            }),
            "delivered orders cannot change"
        );
    }

    #[test]
    fn cancelled_is_terminal() {
        let result = OrderStatus::Cancelled.transition_to(OrderStatus::Shipped);

        assert_eq!(
            result,
            Err(TransitionError::Terminal {
                status: OrderStatus::Cancelled,
            }),
            "cancelled orders cannot change"
        );
    }

    #[test]
    fn transition_to_the_same_status_is_illegal() {
        let result = OrderStatus::Processing.transition_to(OrderStatus::Processing);

        assert!(
            matches!(result, Err(TransitionError::Illegal { .. })),
            "expected an illegal move, got {result:?}"
        );
    }

    #[test]
    fn terminal_statuses_are_not_cancellable() {
        assert!(OrderStatus::Processing.is_cancellable(), "processing is");
        assert!(OrderStatus::Shipped.is_cancellable(), "shipped is");
        assert!(!OrderStatus::Delivered.is_cancellable(), "delivered is not");
        assert!(!OrderStatus::Cancelled.is_cancellable(), "cancelled is not");
    }

    #[test]
    fn display_id_is_the_last_eight_millisecond_digits() -> TestResult {
        let timestamp = Timestamp::from_millisecond(1_726_000_123_456)?;

        assert_eq!(
            OrderRecord::display_id_at(timestamp),
            "00123456",
            "expected the trailing eight digits"
        );
        Ok(())
    }

    #[test]
    fn display_id_of_an_early_timestamp_keeps_all_digits() -> TestResult {
        let timestamp = Timestamp::from_millisecond(12345)?;

        assert_eq!(
            OrderRecord::display_id_at(timestamp),
            "12345",
            "short millisecond counts are used whole"
        );
        Ok(())
    }

    #[test]
    fn status_serializes_as_its_name() -> TestResult {
        let json = serde_json::to_string(&OrderStatus::Processing)?;
        assert_eq!(json, r#""Processing""#, "expected the variant name");
        Ok(())
    }
}
