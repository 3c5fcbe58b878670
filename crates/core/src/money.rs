//! Monetary amounts.

use std::{fmt, iter::Sum, ops::Deref};

use serde::{Deserialize, Serialize};

/// A monetary amount in whole currency units.
///
/// The storefront prices everything in whole units (no paise/cents are ever
/// stored). Payment gateways want minor units, so [`Amount::to_minor_units`]
/// scales by 100 at that boundary and nowhere else.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(u64);

impl Amount {
    /// Create an amount from whole currency units.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// The amount in whole currency units.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// The amount scaled to minor units (×100) for gateway requests.
    #[must_use]
    pub const fn to_minor_units(self) -> u64 {
        self.0.saturating_mul(100)
    }

    /// Add, clamping at `u64::MAX` instead of wrapping.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Multiply by a count, clamping at `u64::MAX` instead of wrapping.
    #[must_use]
    pub const fn saturating_mul(self, count: u64) -> Self {
        Self(self.0.saturating_mul(count))
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl Deref for Amount {
    type Target = u64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::new(0), Amount::saturating_add)
    }
}

impl fmt::Display for Amount {
    /// Formats with thousands separators: `1550` renders as `1,550`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.0.to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

        for (count, ch) in digits.chars().rev().enumerate() {
            if count != 0 && count % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }

        f.write_str(&grouped.chars().rev().collect::<String>())
    }
}
