//! Cash-on-delivery eligibility.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::money::Amount;

/// Reasons a cash-on-delivery order is refused.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodRejection {
    /// The order total is above the configured ceiling.
    #[error("order total {total} exceeds the cash-on-delivery limit of {ceiling}")]
    AboveCeiling {
        /// Grand total that was checked.
        total: Amount,
        /// The configured ceiling.
        ceiling: Amount,
    },

    /// Couriers do not collect cash in this area.
    #[error("cash on delivery is not available for pincode {pincode}")]
    BlockedPincode {
        /// The delivery pincode that was checked.
        pincode: String,
    },
}

/// Policy limiting which orders may pay cash on delivery.
///
/// Both checks run against the order's grand total (items plus shipping) and
/// the delivery pincode exactly as entered. The ceiling is inclusive: an
/// order totalling exactly `ceiling` is still eligible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodPolicy {
    /// Largest grand total couriers will collect in cash.
    pub ceiling: Amount,
    /// Pincodes where cash collection is not offered, matched exactly.
    pub blocked_pincodes: FxHashSet<String>,
}

impl Default for CodPolicy {
    fn default() -> Self {
        Self {
            ceiling: Amount::new(10_000),
            blocked_pincodes: FxHashSet::default(),
        }
    }
}

impl CodPolicy {
    /// Check whether an order may be paid in cash on delivery.
    ///
    /// # Errors
    ///
    /// Returns [`CodRejection::AboveCeiling`] when `grand_total` exceeds the
    /// ceiling, or [`CodRejection::BlockedPincode`] when the delivery pincode
    /// is on the blocklist.
    pub fn validate(&self, grand_total: Amount, pincode: &str) -> Result<(), CodRejection> {
        if grand_total > self.ceiling {
            return Err(CodRejection::AboveCeiling {
                total: grand_total,
                ceiling: self.ceiling,
            });
        }

        if self.blocked_pincodes.contains(pincode) {
            return Err(CodRejection::BlockedPincode {
                pincode: pincode.to_owned(),
            });
        }

        Ok(())
    }
}
