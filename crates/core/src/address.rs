//! Delivery addresses.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced by address validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    /// A required field is blank.
    #[error("address field `{0}` must not be blank")]
    MissingField(&'static str),
}

/// A delivery address as entered by the buyer.
///
/// All fields are free-form text. The only rule the engine enforces is that
/// none of them is blank; formats (pincode length, phone digits) are left to
/// the storefront.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressInfo {
    /// Recipient name.
    pub name: String,
    /// Street address.
    pub address: String,
    /// State or region, used for shipping surcharge lookup.
    pub state: String,
    /// Postal code, used for cash-on-delivery eligibility.
    pub pincode: String,
    /// Contact phone number.
    pub phone_number: String,
}

impl AddressInfo {
    /// Check that every field carries a non-blank value.
    ///
    /// Fields are checked in declaration order and the first blank one is
    /// reported.
    ///
    /// # Errors
    ///
    /// Returns [`AddressError::MissingField`] naming the offending field.
    pub fn validate(&self) -> Result<(), AddressError> {
        let fields = [
            ("name", &self.name),
            ("address", &self.address),
            ("state", &self.state),
            ("pincode", &self.pincode),
            ("phone_number", &self.phone_number),
        ];

        for (label, value) in fields {
            if value.trim().is_empty() {
                return Err(AddressError::MissingField(label));
            }
        }

        Ok(())
    }
}
