//! The payment gateway seam.

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;

use till::money::Amount;

/// Errors raised before a checkout attempt reaches a terminal outcome.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The gateway session could not be created at all.
    #[error("payment gateway unreachable: {reason}")]
    Unreachable {
        /// Gateway-specific explanation.
        reason: String,
    },
}

/// One hosted-checkout request.
///
/// Gateways charge in minor units; build requests with
/// [`CheckoutRequest::for_amount`] so the scaling happens in exactly one
/// place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    /// Amount to collect, in minor units (paise, cents).
    pub amount_minor_units: u64,
    /// ISO currency code, e.g. `INR`.
    pub currency: String,
    /// Line shown on the gateway's payment page.
    pub description: String,
}

impl CheckoutRequest {
    /// Build a request for a whole-unit amount.
    #[must_use]
    pub fn for_amount(
        amount: Amount,
        currency: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            amount_minor_units: amount.to_minor_units(),
            currency: currency.into(),
            description: description.into(),
        }
    }
}

/// How a hosted-checkout attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayOutcome {
    /// The buyer paid.
    Success {
        /// Gateway transaction reference, stored as the order's payment id.
        transaction_ref: String,
    },
    /// The gateway declined the payment.
    Failure {
        /// Gateway-supplied reason.
        reason: String,
    },
    /// The buyer closed the payment page without paying.
    Cancelled,
}

/// A hosted payment page.
///
/// `collect` drives one attempt from session creation to a terminal
/// outcome. Declines and buyer cancellations are outcomes, not errors;
/// [`GatewayError`] is reserved for attempts that never produced one.
#[automock]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Run one checkout attempt to its terminal outcome.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Unreachable`] when no session could be
    /// created.
    async fn collect(&self, request: CheckoutRequest) -> Result<GatewayOutcome, GatewayError>;
}
