//! Cancellation and refund resolution.

use std::{fmt, sync::Arc};

use jiff::Timestamp;
use thiserror::Error;
use till::{
    orders::{OrderStatus, TransitionError},
    refunds::{RefundRecord, RefundResolution},
};

use crate::{
    identity::Actor,
    orders::{directory::OrderDirectory, records::OrderUuid, repository::OrdersRepository},
    refunds::{
        records::{RefundUuid, StoredRefund},
        repository::RefundsRepository,
    },
    store::StoreError,
};

/// Errors raised while cancelling orders or resolving refunds.
#[derive(Debug, Error)]
pub enum RefundWorkflowError {
    /// The order is already cancelled; a refund request already exists.
    #[error("order is already cancelled")]
    AlreadyCancelled,

    /// The caller is signed in but is not an operator.
    #[error("this action needs an operator account")]
    OperatorRequired,

    /// The order belongs to a different account.
    #[error("this order belongs to another account")]
    Forbidden,

    /// No document is stored under that id.
    #[error("no such order or refund request")]
    NotFound,

    /// The refund request already carries a decision.
    #[error("refund request has already been processed")]
    AlreadyProcessed,

    /// The order cannot be cancelled from its current status.
    #[error(transparent)]
    Transition(#[from] TransitionError),

    /// The store refused the read or write.
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for RefundWorkflowError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => Self::NotFound,
            other => Self::Store(other),
        }
    }
}

/// Cancels orders and settles the refund requests that raises.
///
/// A cancellation flips the order to [`OrderStatus::Cancelled`] and stores a
/// pending [`RefundRecord`] snapshotting everything a later resolution
/// needs. The two writes are not atomic; if the second fails the order stays
/// cancelled and the buyer retries the cancellation, which then takes the
/// [`RefundWorkflowError::AlreadyCancelled`] path.
pub struct RefundWorkflow {
    orders: OrdersRepository,
    refunds: RefundsRepository,
    directory: Arc<OrderDirectory>,
}

impl fmt::Debug for RefundWorkflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefundWorkflow").finish_non_exhaustive()
    }
}

impl RefundWorkflow {
    pub(crate) fn new(
        orders: OrdersRepository,
        refunds: RefundsRepository,
        directory: Arc<OrderDirectory>,
    ) -> Self {
        Self {
            orders,
            refunds,
            directory,
        }
    }

    /// Cancel an order and raise a pending refund request for its total.
    ///
    /// Owners may cancel their own orders; operators may cancel any.
    ///
    /// # Errors
    ///
    /// Returns a [`RefundWorkflowError`] if the order is missing, belongs to
    /// someone else, is already cancelled, or is past the point of
    /// cancellation.
    pub async fn cancel_order(
        &self,
        actor: &Actor,
        order: OrderUuid,
    ) -> Result<StoredRefund, RefundWorkflowError> {
        let mut stored = self.orders.get(order).await?;

        if !actor.operator && stored.record.user_id != actor.user_id {
            return Err(RefundWorkflowError::Forbidden);
        }

        if stored.record.status == OrderStatus::Cancelled {
            return Err(RefundWorkflowError::AlreadyCancelled);
        }

        stored.record.status = stored.record.status.transition_to(OrderStatus::Cancelled)?;
        self.orders.set_status(order, stored.record.status).await?;

        let record = RefundRecord::for_order(order.into_uuid(), &stored.record, Timestamp::now());
        let uuid = self.refunds.create(&record).await?;
        self.directory.mark_stale().await;

        tracing::info!(
            order = %record.order_display_id,
            amount = %record.refund_amount,
            "order cancelled, refund requested",
        );

        Ok(StoredRefund { uuid, record })
    }

    /// Record an operator's decision on a pending refund request.
    ///
    /// The decision reads nothing but the request itself, so it still works
    /// after the cancelled order is gone.
    ///
    /// # Errors
    ///
    /// Returns a [`RefundWorkflowError`] if the caller is not an operator,
    /// the request is missing, or it already carries a decision. A repeated
    /// decision leaves the stored one untouched.
    pub async fn resolve(
        &self,
        actor: &Actor,
        refund: RefundUuid,
        resolution: RefundResolution,
    ) -> Result<StoredRefund, RefundWorkflowError> {
        if !actor.operator {
            return Err(RefundWorkflowError::OperatorRequired);
        }

        let mut stored = self.refunds.get(refund).await?;

        if stored.record.resolve(resolution).is_err() {
            tracing::warn!(
                refund = %refund,
                status = %stored.record.status,
                "refund request was already processed",
            );
            return Err(RefundWorkflowError::AlreadyProcessed);
        }

        self.refunds.store_resolution(refund, &stored.record).await?;

        tracing::info!(
            refund = %refund,
            order = %stored.record.order_display_id,
            status = %stored.record.status,
            "refund request resolved",
        );

        Ok(stored)
    }

    /// Every refund request in the store, newest first. Operators only.
    ///
    /// # Errors
    ///
    /// Returns a [`RefundWorkflowError`] if the caller is not an operator or
    /// the store cannot be read.
    pub async fn all_requests(
        &self,
        actor: &Actor,
    ) -> Result<Vec<StoredRefund>, RefundWorkflowError> {
        if !actor.operator {
            return Err(RefundWorkflowError::OperatorRequired);
        }

        let mut requests = self.refunds.list().await?;
        requests.sort_by(|a, b| b.record.requested_at.cmp(&a.record.requested_at));

        Ok(requests)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;
    use till::{money::Amount, orders::PaymentMethod, refunds::RefundStatus};

    use super::*;
    use crate::{
        store::DocumentStore,
        test::{
            context::TestContext,
            helpers::{buyer_actor, operator_actor, place_order},
        },
    };

    #[tokio::test]
    async fn buyers_cancel_their_own_orders() -> TestResult {
        let ctx = TestContext::buyer();
        let buyer = buyer_actor();
        let stored = place_order(&ctx, 2, PaymentMethod::CashOnDelivery).await?;

        let refund = ctx.app.refunds.cancel_order(&buyer, stored.uuid).await?;

        assert_eq!(refund.record.status, RefundStatus::Pending, "starts pending");
        assert_eq!(
            refund.record.refund_amount,
            Amount::new(1550),
            "the full order total is refunded"
        );
        assert_eq!(refund.record.user_name, "Meera Shah");

        let reread = ctx.app.orders.get(&buyer, stored.uuid).await?;
        assert_eq!(
            reread.record.status,
            OrderStatus::Cancelled,
            "the order is cancelled"
        );
        Ok(())
    }

    #[tokio::test]
    async fn shipped_orders_can_still_be_cancelled() -> TestResult {
        let ctx = TestContext::buyer();
        let stored = place_order(&ctx, 1, PaymentMethod::CashOnDelivery).await?;
        ctx.app
            .orders
            .update_status(&operator_actor(), stored.uuid, OrderStatus::Shipped)
            .await?;

        let refund = ctx
            .app
            .refunds
            .cancel_order(&buyer_actor(), stored.uuid)
            .await?;

        assert_eq!(refund.record.status, RefundStatus::Pending);
        Ok(())
    }

    #[tokio::test]
    async fn delivered_orders_cannot_be_cancelled() -> TestResult {
        let ctx = TestContext::buyer();
        let operator = operator_actor();
        let stored = place_order(&ctx, 1, PaymentMethod::CashOnDelivery).await?;
        ctx.app
            .orders
            .update_status(&operator, stored.uuid, OrderStatus::Shipped)
            .await?;
        ctx.app
            .orders
            .update_status(&operator, stored.uuid, OrderStatus::Delivered)
            .await?;

        let result = ctx
            .app
            .refunds
            .cancel_order(&buyer_actor(), stored.uuid)
            .await;

        assert!(
            matches!(
                result,
                Err(RefundWorkflowError::Transition(TransitionError::Terminal { .. }))
            ),
            "expected the state machine to refuse, got {result:?}"
        );
        Ok(())
    }

    #[tokio::test]
    async fn cancelling_twice_is_refused() -> TestResult {
        let ctx = TestContext::buyer();
        let buyer = buyer_actor();
        let stored = place_order(&ctx, 1, PaymentMethod::CashOnDelivery).await?;
        ctx.app.refunds.cancel_order(&buyer, stored.uuid).await?;

        let result = ctx.app.refunds.cancel_order(&buyer, stored.uuid).await;

        assert!(
            matches!(result, Err(RefundWorkflowError::AlreadyCancelled)),
            "expected the repeat to be refused, got {result:?}"
        );
        assert_eq!(
            ctx.store.count("refund_requests").await,
            1,
            "no second request is raised"
        );
        Ok(())
    }

    #[tokio::test]
    async fn cancelling_someone_elses_order_is_forbidden() -> TestResult {
        let ctx = TestContext::buyer();
        let stored = place_order(&ctx, 1, PaymentMethod::CashOnDelivery).await?;

        let other = Actor::customer("user-2", "arjun@example.com", "Arjun Rao");
        let result = ctx.app.refunds.cancel_order(&other, stored.uuid).await;

        assert!(
            matches!(result, Err(RefundWorkflowError::Forbidden)),
            "expected the ownership gate, got {result:?}"
        );
        Ok(())
    }

    #[tokio::test]
    async fn operators_approve_pending_requests() -> TestResult {
        let ctx = TestContext::buyer();
        let stored = place_order(&ctx, 1, PaymentMethod::CashOnDelivery).await?;
        let refund = ctx
            .app
            .refunds
            .cancel_order(&buyer_actor(), stored.uuid)
            .await?;

        let resolved = ctx
            .app
            .refunds
            .resolve(&operator_actor(), refund.uuid, RefundResolution::Approve)
            .await?;

        assert_eq!(resolved.record.status, RefundStatus::Approved);
        assert!(resolved.record.processed, "the request is spent");
        Ok(())
    }

    #[tokio::test]
    async fn resolution_needs_an_operator() -> TestResult {
        let ctx = TestContext::buyer();
        let stored = place_order(&ctx, 1, PaymentMethod::CashOnDelivery).await?;
        let refund = ctx
            .app
            .refunds
            .cancel_order(&buyer_actor(), stored.uuid)
            .await?;

        let result = ctx
            .app
            .refunds
            .resolve(&buyer_actor(), refund.uuid, RefundResolution::Approve)
            .await;

        assert!(
            matches!(result, Err(RefundWorkflowError::OperatorRequired)),
            "expected the operator gate, got {result:?}"
        );
        Ok(())
    }

    #[tokio::test]
    async fn a_second_decision_is_refused_and_the_first_stands() -> TestResult {
        let ctx = TestContext::buyer();
        let operator = operator_actor();
        let stored = place_order(&ctx, 1, PaymentMethod::CashOnDelivery).await?;
        let refund = ctx
            .app
            .refunds
            .cancel_order(&buyer_actor(), stored.uuid)
            .await?;

        ctx.app
            .refunds
            .resolve(&operator, refund.uuid, RefundResolution::Approve)
            .await?;
        let result = ctx
            .app
            .refunds
            .resolve(&operator, refund.uuid, RefundResolution::Reject)
            .await;

        assert!(
            matches!(result, Err(RefundWorkflowError::AlreadyProcessed)),
            "expected the repeat to be refused, got {result:?}"
        );

        let requests = ctx.app.refunds.all_requests(&operator).await?;
        assert_eq!(
            requests[0].record.status,
            RefundStatus::Approved,
            "the first decision stands"
        );
        Ok(())
    }

    #[tokio::test]
    async fn resolution_survives_order_deletion() -> TestResult {
        let ctx = TestContext::buyer();
        let stored = place_order(&ctx, 2, PaymentMethod::CashOnDelivery).await?;
        let refund = ctx
            .app
            .refunds
            .cancel_order(&buyer_actor(), stored.uuid)
            .await?;

        // The order document disappears; the snapshot is all that is left.
        ctx.store.delete("orders", stored.uuid.into()).await?;

        let resolved = ctx
            .app
            .refunds
            .resolve(&operator_actor(), refund.uuid, RefundResolution::Approve)
            .await?;

        assert_eq!(resolved.record.status, RefundStatus::Approved);
        assert_eq!(resolved.record.refund_amount, Amount::new(1550));
        Ok(())
    }

    #[tokio::test]
    async fn the_request_queue_is_operator_only_and_newest_first() -> TestResult {
        let ctx = TestContext::buyer();
        let buyer = buyer_actor();
        let operator = operator_actor();
        let first = place_order(&ctx, 1, PaymentMethod::CashOnDelivery).await?;
        let second = place_order(&ctx, 1, PaymentMethod::CashOnDelivery).await?;
        let earlier = ctx.app.refunds.cancel_order(&buyer, first.uuid).await?;
        let later = ctx.app.refunds.cancel_order(&buyer, second.uuid).await?;

        let result = ctx.app.refunds.all_requests(&buyer).await;
        assert!(
            matches!(result, Err(RefundWorkflowError::OperatorRequired)),
            "expected the operator gate, got {result:?}"
        );

        let requests = ctx.app.refunds.all_requests(&operator).await?;
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].uuid, later.uuid, "newest first");
        assert_eq!(requests[1].uuid, earlier.uuid);
        Ok(())
    }
}
