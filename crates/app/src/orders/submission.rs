//! Order submission.

use std::{fmt, sync::Arc};

use jiff::Timestamp;
use thiserror::Error;
use till::{
    cart::Cart,
    checkout::{CheckoutError, CheckoutFlow},
    cod::CodRejection,
    orders::{COD_PAYMENT_ID, OrderRecord, PaymentMethod},
};

use crate::{
    config::Policies,
    gateway::{CheckoutRequest, GatewayOutcome, PaymentGateway},
    identity::IdentityProvider,
    orders::{directory::OrderDirectory, records::StoredOrder, repository::OrdersRepository},
    store::StoreError,
};

/// Errors that stop an order from being placed.
///
/// None of these leave a partial order behind: the cart and the checkout
/// flow are only touched after the store has acknowledged the write.
#[derive(Debug, Error)]
pub enum SubmissionError {
    /// Nobody is signed in.
    #[error("sign in to place an order")]
    NotAuthenticated,

    /// The checkout flow is not at review, or the cart is unusable.
    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    /// The order does not qualify for cash on delivery.
    #[error(transparent)]
    CodIneligible(#[from] CodRejection),

    /// The gateway declined the payment or never produced an outcome.
    #[error("payment failed: {reason}")]
    PaymentFailed {
        /// Gateway-supplied reason.
        reason: String,
    },

    /// The buyer closed the payment page without paying.
    #[error("payment was cancelled before completion")]
    PaymentCancelled,

    /// The paid-for order could not be saved.
    #[error(transparent)]
    Persistence(#[from] StoreError),
}

/// Turns a reviewed checkout into a stored order.
///
/// Submission is the only place orders are created. The sequence is fixed:
/// identity, draft, payment, persist, and only then clear the cart and close
/// the flow. A failure at any point leaves the buyer free to fix the problem
/// and submit again.
pub struct OrderSubmissionService {
    repo: OrdersRepository,
    gateway: Arc<dyn PaymentGateway>,
    identity: Arc<dyn IdentityProvider>,
    directory: Arc<OrderDirectory>,
    policies: Policies,
}

impl fmt::Debug for OrderSubmissionService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderSubmissionService")
            .field("policies", &self.policies)
            .finish_non_exhaustive()
    }
}

impl OrderSubmissionService {
    pub(crate) fn new(
        repo: OrdersRepository,
        gateway: Arc<dyn PaymentGateway>,
        identity: Arc<dyn IdentityProvider>,
        directory: Arc<OrderDirectory>,
        policies: Policies,
    ) -> Self {
        Self {
            repo,
            gateway,
            identity,
            directory,
            policies,
        }
    }

    /// Place the order a flow has under review.
    ///
    /// Cash-on-delivery orders are validated against policy and stored with
    /// [`COD_PAYMENT_ID`]; online orders are stored with the gateway's
    /// transaction reference. The cart is cleared and the flow confirmed
    /// only after the store acknowledges the write.
    ///
    /// # Errors
    ///
    /// Returns a [`SubmissionError`] naming the first gate that refused; the
    /// cart and flow are left as they were.
    pub async fn submit(
        &self,
        flow: &mut CheckoutFlow,
        cart: &mut Cart,
    ) -> Result<StoredOrder, SubmissionError> {
        let actor = self
            .identity
            .current_actor()
            .await
            .ok_or(SubmissionError::NotAuthenticated)?;

        let draft = flow.draft(cart, &self.policies.shipping)?;

        let placed_at = Timestamp::now();
        let display_id = OrderRecord::display_id_at(placed_at);

        let payment_id = match draft.payment_method {
            PaymentMethod::CashOnDelivery => {
                self.policies
                    .cod
                    .validate(draft.grand_total, &draft.address.pincode)?;

                COD_PAYMENT_ID.to_owned()
            }
            PaymentMethod::OnlineGateway => {
                let request = CheckoutRequest::for_amount(
                    draft.grand_total,
                    self.policies.currency.clone(),
                    format!("Order #{display_id}"),
                );

                match self.gateway.collect(request).await {
                    Ok(GatewayOutcome::Success { transaction_ref }) => transaction_ref,
                    Ok(GatewayOutcome::Failure { reason }) => {
                        return Err(SubmissionError::PaymentFailed { reason });
                    }
                    Ok(GatewayOutcome::Cancelled) => {
                        return Err(SubmissionError::PaymentCancelled);
                    }
                    Err(err) => {
                        return Err(SubmissionError::PaymentFailed {
                            reason: err.to_string(),
                        });
                    }
                }
            }
        };

        let record =
            OrderRecord::from_draft(draft, actor.email, actor.user_id, payment_id, placed_at);
        let uuid = self.repo.create(&record).await?;

        // The store has acknowledged the order; only now is the cart spent.
        cart.clear();
        flow.confirm()?;
        self.directory.mark_stale().await;

        tracing::info!(
            order = %record.display_id,
            total = %record.total_amount,
            method = %record.payment_method,
            "order placed",
        );

        Ok(StoredOrder { uuid, record })
    }
}
