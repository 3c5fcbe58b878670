//! Application wiring.

use std::{fmt, sync::Arc};

use crate::{
    config::Policies,
    gateway::PaymentGateway,
    identity::IdentityProvider,
    orders::{
        directory::OrderDirectory, repository::OrdersRepository,
        submission::OrderSubmissionService,
    },
    refunds::{repository::RefundsRepository, workflow::RefundWorkflow},
    store::DocumentStore,
};

/// Every service the storefront exposes, wired over one store.
///
/// The three services share a single [`OrderDirectory`] so that any write,
/// whichever service made it, invalidates the cached order lists.
#[derive(Clone)]
pub struct AppContext {
    /// Places orders.
    pub submission: Arc<OrderSubmissionService>,
    /// Lists orders and advances their lifecycle.
    pub orders: Arc<OrderDirectory>,
    /// Cancels orders and settles the resulting refund requests.
    pub refunds: Arc<RefundWorkflow>,
    /// The policies the services were built with.
    pub policies: Policies,
}

impl fmt::Debug for AppContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppContext")
            .field("policies", &self.policies)
            .finish_non_exhaustive()
    }
}

impl AppContext {
    /// Wire the services over the given seams.
    #[must_use]
    pub fn new(
        store: Arc<dyn DocumentStore>,
        gateway: Arc<dyn PaymentGateway>,
        identity: Arc<dyn IdentityProvider>,
        policies: Policies,
    ) -> Self {
        let orders_repo = OrdersRepository::new(Arc::clone(&store));
        let refunds_repo = RefundsRepository::new(store);
        let directory = Arc::new(OrderDirectory::new(orders_repo.clone()));

        let submission = Arc::new(OrderSubmissionService::new(
            orders_repo.clone(),
            gateway,
            identity,
            Arc::clone(&directory),
            policies.clone(),
        ));
        let refunds = Arc::new(RefundWorkflow::new(
            orders_repo,
            refunds_repo,
            Arc::clone(&directory),
        ));

        Self {
            submission,
            orders: directory,
            refunds,
            policies,
        }
    }
}
