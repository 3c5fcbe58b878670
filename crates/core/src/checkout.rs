//! The checkout flow state machine.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    address::{AddressError, AddressInfo},
    cart::{Cart, CartLine},
    money::Amount,
    orders::PaymentMethod,
    shipping::ShippingTable,
};

/// Errors produced by checkout flow operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CheckoutError {
    /// The operation is only valid at a different step.
    #[error("expected checkout step {expected}, found {actual}")]
    WrongStep {
        /// Step the operation requires.
        expected: CheckoutStep,
        /// Step the flow is actually at.
        actual: CheckoutStep,
    },

    /// The submitted address failed validation.
    #[error(transparent)]
    IncompleteAddress(#[from] AddressError),

    /// No address has been submitted to the flow yet.
    #[error("no delivery address has been submitted")]
    AddressMissing,

    /// Orders cannot be drafted from an empty cart.
    #[error("cannot draft an order from an empty cart")]
    EmptyCart,
}

/// Where a buyer is in the checkout flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckoutStep {
    /// Entering the delivery address.
    Address,
    /// Choosing how to pay.
    Payment,
    /// Reviewing the order before placing it.
    Review,
    /// The order was placed. Terminal.
    Confirmed,
    /// The buyer walked away. Terminal.
    Abandoned,
}

impl fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Address => "address",
            Self::Payment => "payment",
            Self::Review => "review",
            Self::Confirmed => "confirmed",
            Self::Abandoned => "abandoned",
        })
    }
}

/// A single buyer's walk through checkout.
///
/// The flow moves forward one step at a time and only by the methods here:
/// an address must validate before the payment step opens, and an order can
/// only be drafted at review. [`CheckoutFlow::back`] steps backwards without
/// losing the submitted address. Once confirmed or abandoned the flow is
/// closed and every operation returns [`CheckoutError::WrongStep`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutFlow {
    step: CheckoutStep,
    address: Option<AddressInfo>,
    payment_method: PaymentMethod,
}

impl Default for CheckoutFlow {
    fn default() -> Self {
        Self::begin()
    }
}

impl CheckoutFlow {
    /// Start a flow at the address step with the default payment method
    /// preselected.
    #[must_use]
    pub fn begin() -> Self {
        Self {
            step: CheckoutStep::Address,
            address: None,
            payment_method: PaymentMethod::default(),
        }
    }

    /// The step the flow is currently at.
    #[must_use]
    pub fn step(&self) -> CheckoutStep {
        self.step
    }

    /// The submitted address, if any.
    #[must_use]
    pub fn address(&self) -> Option<&AddressInfo> {
        self.address.as_ref()
    }

    /// The currently selected payment method.
    #[must_use]
    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    /// Submit the delivery address and advance to the payment step.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::WrongStep`] outside the address step and
    /// [`CheckoutError::IncompleteAddress`] when a field is blank, in which
    /// case the flow does not advance.
    pub fn submit_address(&mut self, address: AddressInfo) -> Result<(), CheckoutError> {
        self.require_step(CheckoutStep::Address)?;
        address.validate()?;

        self.address = Some(address);
        self.step = CheckoutStep::Payment;

        Ok(())
    }

    /// Choose how to pay. Only valid at the payment step.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::WrongStep`] outside the payment step.
    pub fn select_payment_method(&mut self, method: PaymentMethod) -> Result<(), CheckoutError> {
        self.require_step(CheckoutStep::Payment)?;
        self.payment_method = method;

        Ok(())
    }

    /// Advance from the payment step to review.
    ///
    /// A payment method is always selected (the flow starts with the
    /// default), so this only checks the step.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::WrongStep`] outside the payment step.
    pub fn proceed_to_review(&mut self) -> Result<(), CheckoutError> {
        self.require_step(CheckoutStep::Payment)?;
        self.step = CheckoutStep::Review;

        Ok(())
    }

    /// Step backwards: review returns to payment, payment returns to the
    /// address step. The submitted address is kept either way.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::WrongStep`] at the address step (there is
    /// nothing earlier) and on closed flows.
    pub fn back(&mut self) -> Result<(), CheckoutError> {
        self.step = match self.step {
            CheckoutStep::Payment => CheckoutStep::Address,
            CheckoutStep::Review => CheckoutStep::Payment,
            actual => {
                return Err(CheckoutError::WrongStep {
                    expected: CheckoutStep::Payment,
                    actual,
                });
            }
        };

        Ok(())
    }

    /// Freeze the cart, address, and totals into an [`OrderDraft`].
    ///
    /// The cart is not consumed; it is only cleared after the order has been
    /// durably stored.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::WrongStep`] outside the review step and
    /// [`CheckoutError::EmptyCart`] when the cart has no lines.
    pub fn draft(&self, cart: &Cart, shipping: &ShippingTable) -> Result<OrderDraft, CheckoutError> {
        self.require_step(CheckoutStep::Review)?;

        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let address = self
            .address
            .clone()
            .ok_or(CheckoutError::AddressMissing)?;

        let subtotal = cart.subtotal();
        let shipping = shipping.surcharge(&address.state);

        Ok(OrderDraft {
            lines: cart.lines().to_vec(),
            address,
            payment_method: self.payment_method,
            subtotal,
            shipping,
            grand_total: subtotal.saturating_add(shipping),
        })
    }

    /// Close the flow after the order has been stored.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::WrongStep`] outside the review step.
    pub fn confirm(&mut self) -> Result<(), CheckoutError> {
        self.require_step(CheckoutStep::Review)?;
        self.step = CheckoutStep::Confirmed;

        Ok(())
    }

    /// Close the flow without an order. Valid at any in-progress step.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::WrongStep`] when the flow is already closed.
    pub fn abandon(&mut self) -> Result<(), CheckoutError> {
        match self.step {
            CheckoutStep::Address | CheckoutStep::Payment | CheckoutStep::Review => {
                self.step = CheckoutStep::Abandoned;
                Ok(())
            }
            actual => Err(CheckoutError::WrongStep {
                expected: CheckoutStep::Review,
                actual,
            }),
        }
    }

    fn require_step(&self, expected: CheckoutStep) -> Result<(), CheckoutError> {
        if self.step == expected {
            Ok(())
        } else {
            Err(CheckoutError::WrongStep {
                expected,
                actual: self.step,
            })
        }
    }
}

/// Everything an order needs, frozen at review time.
///
/// Totals are computed once when the draft is built; submitting the same
/// draft later yields the same order regardless of rate changes in between.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    /// Cart lines at review time.
    pub lines: Vec<CartLine>,
    /// Validated delivery address.
    pub address: AddressInfo,
    /// Selected payment method.
    pub payment_method: PaymentMethod,
    /// Sum of line totals.
    pub subtotal: Amount,
    /// Shipping surcharge for the address state.
    pub shipping: Amount,
    /// `subtotal + shipping`; becomes the order's `total_amount`.
    pub grand_total: Amount,
}
