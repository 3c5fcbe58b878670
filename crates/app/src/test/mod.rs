//! Test context and helpers for service-level tests.

pub(crate) mod helpers;
