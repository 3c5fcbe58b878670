//! Order lookup and lifecycle transitions.

use std::fmt;

use rustc_hash::FxHashMap;
use thiserror::Error;
use tokio::sync::RwLock;
use till::{
    invoice::Invoice,
    orders::{OrderStatus, TransitionError},
};

use crate::{
    identity::Actor,
    orders::{
        records::{OrderUuid, StoredOrder},
        repository::OrdersRepository,
    },
    store::StoreError,
};

/// Errors raised while reading or advancing stored orders.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// The caller is signed in but is not an operator.
    #[error("this action needs an operator account")]
    OperatorRequired,

    /// The order belongs to a different account.
    #[error("this order belongs to another account")]
    Forbidden,

    /// No order is stored under that id.
    #[error("no such order")]
    NotFound,

    /// The requested status change is not allowed.
    #[error(transparent)]
    Transition(#[from] TransitionError),

    /// The store refused the read or write.
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for LifecycleError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => Self::NotFound,
            other => Self::Store(other),
        }
    }
}

/// Read side of the order lifecycle.
///
/// Buyers see their own orders through a per-account cache that survives
/// until the next write anywhere in the system. Operators always read
/// straight from the store, so cached lists can lag a concurrent write by
/// at most one [`mark_stale`](Self::mark_stale).
pub struct OrderDirectory {
    repo: OrdersRepository,
    cache: RwLock<FxHashMap<String, Vec<StoredOrder>>>,
}

impl fmt::Debug for OrderDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderDirectory").finish_non_exhaustive()
    }
}

impl OrderDirectory {
    pub(crate) fn new(repo: OrdersRepository) -> Self {
        Self {
            repo,
            cache: RwLock::new(FxHashMap::default()),
        }
    }

    /// The actor's own orders, newest first.
    ///
    /// Serves the cached list when one exists; `force_refresh` bypasses the
    /// cache and replaces it with the store's answer.
    ///
    /// # Errors
    ///
    /// Returns a [`LifecycleError`] if the store cannot be read.
    pub async fn orders_for(
        &self,
        actor: &Actor,
        force_refresh: bool,
    ) -> Result<Vec<StoredOrder>, LifecycleError> {
        if !force_refresh
            && let Some(orders) = self.cache.read().await.get(&actor.user_id)
        {
            tracing::debug!(user = %actor.user_id, "serving cached order list");
            return Ok(orders.clone());
        }

        let orders = self.fetch_for_user(&actor.user_id).await?;

        self.cache
            .write()
            .await
            .insert(actor.user_id.clone(), orders.clone());

        Ok(orders)
    }

    /// Every order in the store, newest first. Operators only.
    ///
    /// # Errors
    ///
    /// Returns a [`LifecycleError`] if the caller is not an operator or the
    /// store cannot be read.
    pub async fn all_orders(&self, actor: &Actor) -> Result<Vec<StoredOrder>, LifecycleError> {
        require_operator(actor)?;

        let mut orders = self.repo.list().await?;
        sort_newest_first(&mut orders);

        Ok(orders)
    }

    /// A single order, visible to its owner and to operators.
    ///
    /// # Errors
    ///
    /// Returns a [`LifecycleError`] if the order does not exist or belongs
    /// to someone else.
    pub async fn get(&self, actor: &Actor, uuid: OrderUuid) -> Result<StoredOrder, LifecycleError> {
        let stored = self.repo.get(uuid).await?;

        if !actor.operator && stored.record.user_id != actor.user_id {
            return Err(LifecycleError::Forbidden);
        }

        Ok(stored)
    }

    /// Move an order to `next`. Operators only.
    ///
    /// Only the status field is written; concurrent edits to other fields
    /// are left alone.
    ///
    /// # Errors
    ///
    /// Returns a [`LifecycleError`] if the caller is not an operator, the
    /// order does not exist, or the move is not allowed from the current
    /// status.
    pub async fn update_status(
        &self,
        actor: &Actor,
        uuid: OrderUuid,
        next: OrderStatus,
    ) -> Result<StoredOrder, LifecycleError> {
        require_operator(actor)?;

        let mut stored = self.repo.get(uuid).await?;

        stored.record.status = stored.record.status.transition_to(next)?;
        self.repo.set_status(uuid, stored.record.status).await?;
        self.mark_stale().await;

        tracing::info!(
            order = %stored.record.display_id,
            status = %stored.record.status,
            "order status updated",
        );

        Ok(stored)
    }

    /// Render the invoice for an order, visible to its owner and operators.
    ///
    /// # Errors
    ///
    /// Returns a [`LifecycleError`] if the order does not exist or belongs
    /// to someone else.
    pub async fn invoice(&self, actor: &Actor, uuid: OrderUuid) -> Result<Invoice, LifecycleError> {
        let stored = self.get(actor, uuid).await?;

        Ok(Invoice::from_order(&stored.record))
    }

    /// Drop every cached list. Called after any write that touches orders.
    pub async fn mark_stale(&self) {
        self.cache.write().await.clear();
    }

    async fn fetch_for_user(&self, user_id: &str) -> Result<Vec<StoredOrder>, StoreError> {
        let mut orders = self.repo.list_for_user(user_id).await?;
        sort_newest_first(&mut orders);

        Ok(orders)
    }
}

fn require_operator(actor: &Actor) -> Result<(), LifecycleError> {
    if actor.operator {
        Ok(())
    } else {
        Err(LifecycleError::OperatorRequired)
    }
}

fn sort_newest_first(orders: &mut [StoredOrder]) {
    orders.sort_by(|a, b| b.record.placed_at.cmp(&a.record.placed_at));
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;
    use till::orders::PaymentMethod;

    use super::*;
    use crate::{
        store::DocumentStore,
        test::{
            context::TestContext,
            helpers::{buyer_actor, operator_actor, place_order},
        },
    };

    #[tokio::test]
    async fn buyers_see_their_own_orders_newest_first() -> TestResult {
        let ctx = TestContext::buyer();
        let first = place_order(&ctx, 1, PaymentMethod::CashOnDelivery).await?;
        let second = place_order(&ctx, 2, PaymentMethod::CashOnDelivery).await?;

        let orders = ctx.app.orders.orders_for(&buyer_actor(), false).await?;

        assert_eq!(orders.len(), 2, "both orders are listed");
        assert_eq!(orders[0].uuid, second.uuid, "newest first");
        assert_eq!(orders[1].uuid, first.uuid, "oldest last");
        Ok(())
    }

    #[tokio::test]
    async fn cached_lists_are_served_until_marked_stale() -> TestResult {
        let ctx = TestContext::buyer();
        let actor = buyer_actor();
        place_order(&ctx, 1, PaymentMethod::CashOnDelivery).await?;

        let warmed = ctx.app.orders.orders_for(&actor, false).await?;
        assert_eq!(warmed.len(), 1);

        // A write behind the directory's back is invisible to the cache.
        ctx.store.delete("orders", warmed[0].uuid.into()).await?;
        let cached = ctx.app.orders.orders_for(&actor, false).await?;
        assert_eq!(cached.len(), 1, "the cache still holds the deleted order");

        ctx.app.orders.mark_stale().await;
        let fresh = ctx.app.orders.orders_for(&actor, false).await?;
        assert!(fresh.is_empty(), "staleness forces a refetch");
        Ok(())
    }

    #[tokio::test]
    async fn force_refresh_bypasses_the_cache() -> TestResult {
        let ctx = TestContext::buyer();
        let actor = buyer_actor();
        let stored = place_order(&ctx, 1, PaymentMethod::CashOnDelivery).await?;

        ctx.app.orders.orders_for(&actor, false).await?;
        ctx.store.delete("orders", stored.uuid.into()).await?;

        let fresh = ctx.app.orders.orders_for(&actor, true).await?;
        assert!(fresh.is_empty(), "the refresh read the store");
        Ok(())
    }

    #[tokio::test]
    async fn all_orders_needs_an_operator() -> TestResult {
        let ctx = TestContext::buyer();
        place_order(&ctx, 1, PaymentMethod::CashOnDelivery).await?;

        let result = ctx.app.orders.all_orders(&buyer_actor()).await;
        assert!(
            matches!(result, Err(LifecycleError::OperatorRequired)),
            "expected the operator gate, got {result:?}"
        );

        let orders = ctx.app.orders.all_orders(&operator_actor()).await?;
        assert_eq!(orders.len(), 1, "operators see everything");
        Ok(())
    }

    #[tokio::test]
    async fn buyers_cannot_read_someone_elses_order() -> TestResult {
        let ctx = TestContext::buyer();
        let stored = place_order(&ctx, 1, PaymentMethod::CashOnDelivery).await?;

        let other = Actor::customer("user-2", "arjun@example.com", "Arjun Rao");
        let result = ctx.app.orders.get(&other, stored.uuid).await;

        assert!(
            matches!(result, Err(LifecycleError::Forbidden)),
            "expected the ownership gate, got {result:?}"
        );
        Ok(())
    }

    #[tokio::test]
    async fn operators_walk_orders_through_the_lifecycle() -> TestResult {
        let ctx = TestContext::buyer();
        let operator = operator_actor();
        let stored = place_order(&ctx, 1, PaymentMethod::CashOnDelivery).await?;

        let shipped = ctx
            .app
            .orders
            .update_status(&operator, stored.uuid, OrderStatus::Shipped)
            .await?;
        assert_eq!(shipped.record.status, OrderStatus::Shipped);

        let delivered = ctx
            .app
            .orders
            .update_status(&operator, stored.uuid, OrderStatus::Delivered)
            .await?;
        assert_eq!(delivered.record.status, OrderStatus::Delivered);
        Ok(())
    }

    #[tokio::test]
    async fn illegal_jumps_are_refused() -> TestResult {
        let ctx = TestContext::buyer();
        let stored = place_order(&ctx, 1, PaymentMethod::CashOnDelivery).await?;

        let result = ctx
            .app
            .orders
            .update_status(&operator_actor(), stored.uuid, OrderStatus::Delivered)
            .await;

        assert!(
            matches!(
                result,
                Err(LifecycleError::Transition(TransitionError::Illegal { .. }))
            ),
            "expected the state machine to refuse, got {result:?}"
        );
        Ok(())
    }

    #[tokio::test]
    async fn buyers_cannot_update_status() -> TestResult {
        let ctx = TestContext::buyer();
        let stored = place_order(&ctx, 1, PaymentMethod::CashOnDelivery).await?;

        let result = ctx
            .app
            .orders
            .update_status(&buyer_actor(), stored.uuid, OrderStatus::Shipped)
            .await;

        assert!(
            matches!(result, Err(LifecycleError::OperatorRequired)),
            "expected the operator gate, got {result:?}"
        );
        Ok(())
    }

    #[tokio::test]
    async fn status_updates_leave_the_rest_of_the_order_alone() -> TestResult {
        let ctx = TestContext::buyer();
        let stored = place_order(&ctx, 2, PaymentMethod::CashOnDelivery).await?;

        ctx.app
            .orders
            .update_status(&operator_actor(), stored.uuid, OrderStatus::Shipped)
            .await?;

        let reread = ctx.app.orders.get(&buyer_actor(), stored.uuid).await?;
        assert_eq!(reread.record.status, OrderStatus::Shipped);
        assert_eq!(reread.record.total_amount, stored.record.total_amount);
        assert_eq!(reread.record.cart_items, stored.record.cart_items);
        assert_eq!(reread.record.payment_id, stored.record.payment_id);
        Ok(())
    }

    #[tokio::test]
    async fn invoices_are_owner_or_operator_only() -> TestResult {
        let ctx = TestContext::buyer();
        let stored = place_order(&ctx, 2, PaymentMethod::CashOnDelivery).await?;

        let invoice = ctx.app.orders.invoice(&buyer_actor(), stored.uuid).await?;
        assert!(
            invoice.render().contains(&stored.record.display_id),
            "the invoice names the order"
        );

        let operator_view = ctx
            .app
            .orders
            .invoice(&operator_actor(), stored.uuid)
            .await?;
        assert_eq!(operator_view.grand_total(), stored.record.total_amount);

        let other = Actor::customer("user-2", "arjun@example.com", "Arjun Rao");
        let result = ctx.app.orders.invoice(&other, stored.uuid).await;
        assert!(
            matches!(result, Err(LifecycleError::Forbidden)),
            "expected the ownership gate, got {result:?}"
        );
        Ok(())
    }

    #[tokio::test]
    async fn missing_orders_read_as_not_found() -> TestResult {
        let ctx = TestContext::buyer();
        let result = ctx
            .app
            .orders
            .get(&buyer_actor(), OrderUuid::now_v7())
            .await;

        assert!(
            matches!(result, Err(LifecycleError::NotFound)),
            "expected not found, got {result:?}"
        );
        Ok(())
    }
}
