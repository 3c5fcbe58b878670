//! Typed document ids.
//!
//! Every collection stores a different record type, and a raw [`Uuid`] makes
//! it too easy to hand an order id to a refund lookup. `TypedUuid<R>` ties
//! the id to the record type it identifies at zero runtime cost.

use std::{
    cmp::Ordering,
    fmt::{Debug, Display, Formatter, Result as FmtResult},
    hash::{Hash, Hasher},
    marker::PhantomData,
};

use uuid::Uuid;

/// A [`Uuid`] that only identifies documents holding an `R`.
pub struct TypedUuid<R>(Uuid, PhantomData<R>);

impl<R> TypedUuid<R> {
    /// Mint a fresh, time-ordered id.
    #[must_use]
    pub fn now_v7() -> Self {
        Self::from_uuid(Uuid::now_v7())
    }

    /// Adopt an id that already exists in the store.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid, PhantomData)
    }

    /// The raw id, for handing to the store.
    #[must_use]
    pub const fn into_uuid(self) -> Uuid {
        self.0
    }
}

impl<R> From<Uuid> for TypedUuid<R> {
    fn from(uuid: Uuid) -> Self {
        Self::from_uuid(uuid)
    }
}

impl<R> From<TypedUuid<R>> for Uuid {
    fn from(typed: TypedUuid<R>) -> Self {
        typed.into_uuid()
    }
}

// Derives would put `R: Clone` and friends on the impls even though only
// the uuid is stored, so the usual traits are written out by hand.

impl<R> Clone for TypedUuid<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for TypedUuid<R> {}

impl<R> Debug for TypedUuid<R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Debug::fmt(&self.0, f)
    }
}

impl<R> Display for TypedUuid<R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Display::fmt(&self.0, f)
    }
}

impl<R> PartialEq for TypedUuid<R> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<R> Eq for TypedUuid<R> {}

impl<R> Hash for TypedUuid<R> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl<R> PartialOrd for TypedUuid<R> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<R> Ord for TypedUuid<R> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}
