//! The identity seam.

use async_trait::async_trait;
use mockall::automock;

/// The signed-in user as the services see them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// Account id; orders and refunds are keyed to it.
    pub user_id: String,
    /// Email recorded on orders.
    pub email: String,
    /// Name for operator screens.
    pub display_name: String,
    /// Whether this actor may manage every order, not just their own.
    pub operator: bool,
}

impl Actor {
    /// A regular buyer.
    #[must_use]
    pub fn customer(
        user_id: impl Into<String>,
        email: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            email: email.into(),
            display_name: display_name.into(),
            operator: false,
        }
    }

    /// A staff member with operator rights.
    #[must_use]
    pub fn operator(
        user_id: impl Into<String>,
        email: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            operator: true,
            ..Self::customer(user_id, email, display_name)
        }
    }
}

/// Supplies the current session's actor.
///
/// Services never authenticate anyone; they ask this seam who is acting and
/// refuse the operation when the answer is `None`.
#[automock]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// The signed-in actor, or `None` for anonymous sessions.
    async fn current_actor(&self) -> Option<Actor>;
}

/// An [`IdentityProvider`] with a fixed answer.
///
/// Covers tests, examples, and single-user tools where the session is known
/// up front.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity {
    actor: Option<Actor>,
}

impl StaticIdentity {
    /// A provider that always reports `actor` as signed in.
    #[must_use]
    pub fn signed_in(actor: Actor) -> Self {
        Self { actor: Some(actor) }
    }

    /// A provider that always reports an anonymous session.
    #[must_use]
    pub fn signed_out() -> Self {
        Self { actor: None }
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentity {
    async fn current_actor(&self) -> Option<Actor> {
        self.actor.clone()
    }
}
