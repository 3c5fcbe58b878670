//! Cart lines and totals.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::money::Amount;

/// Errors that can occur when mutating a cart.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    /// Quantities must be positive; zero is only meaningful to
    /// [`Cart::set_quantity`], which treats it as removal.
    #[error("invalid quantity: {quantity}")]
    InvalidQuantity {
        /// The rejected quantity, as given.
        quantity: i64,
    },

    /// No line matches the requested product/variant pair.
    #[error("no cart line for product {product_id} (variant {variant:?})")]
    LineNotFound {
        /// Product identifier that was looked up.
        product_id: String,
        /// Variant that was looked up.
        variant: Option<String>,
    },
}

/// The product details captured when a buyer adds something to the cart.
///
/// Carts copy these fields instead of referencing a catalog, so a later
/// catalog price change never alters a line already in a cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductView {
    /// Catalog identifier.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Unit price at the time of adding.
    pub price: Amount,
}

/// Identity of a cart line: the product plus its chosen variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineKey {
    /// Catalog identifier.
    pub product_id: String,
    /// Chosen variant, if the product has any.
    pub variant: Option<String>,
}

impl LineKey {
    /// Key for a product without variants.
    #[must_use]
    pub fn product(product_id: impl Into<String>) -> Self {
        Self {
            product_id: product_id.into(),
            variant: None,
        }
    }

    /// Key for a specific variant of a product.
    #[must_use]
    pub fn variant(product_id: impl Into<String>, variant: impl Into<String>) -> Self {
        Self {
            product_id: product_id.into(),
            variant: Some(variant.into()),
        }
    }
}

/// One cart line: a product/variant pair with a quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Catalog identifier.
    pub product_id: String,
    /// Chosen variant, if any.
    pub variant: Option<String>,
    /// Display title copied from the product.
    pub title: String,
    /// Unit price copied from the product.
    pub price: Amount,
    /// Number of units.
    pub quantity: u32,
}

impl CartLine {
    /// The line's identity within a cart.
    #[must_use]
    pub fn key(&self) -> LineKey {
        LineKey {
            product_id: self.product_id.clone(),
            variant: self.variant.clone(),
        }
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Amount {
        self.price.saturating_mul(u64::from(self.quantity))
    }

    fn matches(&self, key: &LineKey) -> bool {
        self.product_id == key.product_id && self.variant == key.variant
    }
}

/// A buyer's cart.
///
/// Lines are unique per product/variant pair and keep their insertion order.
/// Totals are always derived from the current lines; nothing is cached.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `quantity` units of a product/variant to the cart.
    ///
    /// If a line for the same pair already exists its quantity is increased;
    /// otherwise a new line is appended.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidQuantity`] when `quantity` is zero.
    pub fn add(
        &mut self,
        product: &ProductView,
        variant: Option<String>,
        quantity: u32,
    ) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity { quantity: 0 });
        }

        let key = LineKey {
            product_id: product.id.clone(),
            variant,
        };

        if let Some(line) = self.lines.iter_mut().find(|line| line.matches(&key)) {
            line.quantity = line.quantity.saturating_add(quantity);
            return Ok(());
        }

        self.lines.push(CartLine {
            product_id: key.product_id,
            variant: key.variant,
            title: product.title.clone(),
            price: product.price,
            quantity,
        });

        Ok(())
    }

    /// Set the quantity of an existing line.
    ///
    /// A quantity of zero removes the line. Negative quantities are rejected
    /// and leave the cart untouched.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidQuantity`] for negative quantities and
    /// [`CartError::LineNotFound`] when no line matches `key`.
    pub fn set_quantity(&mut self, key: &LineKey, quantity: i64) -> Result<(), CartError> {
        if quantity < 0 {
            return Err(CartError::InvalidQuantity { quantity });
        }

        if quantity == 0 {
            self.remove(key)?;
            return Ok(());
        }

        let quantity =
            u32::try_from(quantity).map_err(|_err| CartError::InvalidQuantity { quantity })?;

        let line = self
            .lines
            .iter_mut()
            .find(|line| line.matches(key))
            .ok_or_else(|| CartError::LineNotFound {
                product_id: key.product_id.clone(),
                variant: key.variant.clone(),
            })?;

        line.quantity = quantity;

        Ok(())
    }

    /// Remove a line from the cart, returning it.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::LineNotFound`] when no line matches `key`.
    pub fn remove(&mut self, key: &LineKey) -> Result<CartLine, CartError> {
        let position = self
            .lines
            .iter()
            .position(|line| line.matches(key))
            .ok_or_else(|| CartError::LineNotFound {
                product_id: key.product_id.clone(),
                variant: key.variant.clone(),
            })?;

        Ok(self.lines.remove(position))
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Look up a line by key.
    #[must_use]
    pub fn line(&self, key: &LineKey) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.matches(key))
    }

    /// All lines, in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines
            .iter()
            .fold(0, |count, line| count.saturating_add(u64::from(line.quantity)))
    }

    /// Sum of all line totals.
    #[must_use]
    pub fn subtotal(&self) -> Amount {
        self.lines.iter().map(CartLine::line_total).sum()
    }
}
