//! Till
//!
//! A storefront order engine: carts, checkout, order lifecycle, refunds, and
//! invoices.
//!
//! The crate is pure domain logic. Nothing here performs I/O; persistence,
//! payment collection, and identity live behind the service layer in
//! `till-app`. The types in this crate enforce the rules that layer relies
//! on:
//!
//! - [`cart::Cart`] keeps one line per product/variant pair and recomputes
//!   totals on every mutation.
//! - [`checkout::CheckoutFlow`] walks a buyer through address, payment, and
//!   review, and produces an [`checkout::OrderDraft`] with frozen totals.
//! - [`orders::OrderStatus`] is the fulfilment state machine; illegal moves
//!   are unrepresentable results, not stored states.
//! - [`refunds::RefundRecord`] resolves exactly once.
//! - [`invoice::Invoice`] renders a stored order without mutating it.

pub mod address;
pub mod cart;
pub mod checkout;
pub mod cod;
pub mod invoice;
pub mod money;
pub mod orders;
pub mod refunds;
pub mod shipping;
