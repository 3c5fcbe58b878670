//! Shipping surcharges.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::money::Amount;

/// Flat shipping surcharge per delivery state.
///
/// Lookup is by exact state name as entered in the address. States without a
/// configured rate fall back to `default_rate`, so the table never fails to
/// produce a charge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShippingTable {
    /// Per-state flat rates.
    rates: FxHashMap<String, Amount>,
    /// Charge applied to states absent from `rates`.
    default_rate: Amount,
}

impl Default for ShippingTable {
    /// The built-in table: Rajasthan ships for 150, everywhere else for 250.
    fn default() -> Self {
        let mut rates = FxHashMap::default();
        rates.insert("Rajasthan".to_owned(), Amount::new(150));

        Self {
            rates,
            default_rate: Amount::new(250),
        }
    }
}

impl ShippingTable {
    /// Build a table from explicit rates and a fallback.
    #[must_use]
    pub fn new(rates: FxHashMap<String, Amount>, default_rate: Amount) -> Self {
        Self {
            rates,
            default_rate,
        }
    }

    /// The surcharge for a delivery state.
    #[must_use]
    pub fn surcharge(&self, state: &str) -> Amount {
        self.rates.get(state).copied().unwrap_or(self.default_rate)
    }

    /// Insert or replace the rate for a state.
    pub fn set_rate(&mut self, state: impl Into<String>, rate: Amount) {
        self.rates.insert(state.into(), rate);
    }

    /// Replace the fallback rate.
    pub fn set_default_rate(&mut self, rate: Amount) {
        self.default_rate = rate;
    }

    /// The fallback rate for unlisted states.
    #[must_use]
    pub fn default_rate(&self) -> Amount {
        self.default_rate
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn configured_state_uses_its_rate() {
        let table = ShippingTable::default();
        assert_eq!(
            table.surcharge("Rajasthan"),
            Amount::new(150),
            "expected the configured rate"
        );
    }

    #[test]
    fn unlisted_state_uses_the_default_rate() {
        let table = ShippingTable::default();
        assert_eq!(
            table.surcharge("Kerala"),
            Amount::new(250),
            "expected the fallback rate"
        );
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let table = ShippingTable::default();
        assert_eq!(
            table.surcharge("rajasthan"),
            Amount::new(250),
            "state names match exactly as entered"
        );
    }

    #[test]
    fn set_rate_overrides_the_table() {
        let mut table = ShippingTable::default();
        table.set_rate("Kerala", Amount::new(180));

        assert_eq!(
            table.surcharge("Kerala"),
            Amount::new(180),
            "expected the overridden rate"
        );
    }

    #[test]
    fn deserializes_with_defaults_for_missing_fields() -> TestResult {
        let table: ShippingTable = serde_json::from_str("{}")?;

        assert_eq!(
            table.surcharge("Rajasthan"),
            Amount::new(150),
            "missing fields fall back to the built-in table"
        );
        Ok(())
    }

    #[test]
    fn deserializes_explicit_rates() -> TestResult {
        let table: ShippingTable =
            serde_json::from_str(r#"{"rates":{"Goa":90},"default_rate":300}"#)?;

        assert_eq!(table.surcharge("Goa"), Amount::new(90), "explicit rate");
        assert_eq!(
            table.surcharge("Punjab"),
            Amount::new(300),
            "explicit fallback"
        );
        Ok(())
    }
}
