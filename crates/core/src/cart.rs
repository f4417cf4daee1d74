//! Cart context

use rust_decimal::Decimal;
use smallvec::SmallVec;
use thiserror::Error;

/// Errors raised when building a cart context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CartError {
    /// The subtotal is below zero.
    #[error("cart subtotal must not be negative")]
    NegativeSubtotal,
}

/// The parts of a purchase that coupon evaluation looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartContext {
    subtotal: Decimal,
    product_ids: SmallVec<[String; 8]>,
}

impl CartContext {
    /// Create a cart context from a subtotal and the product ids in the cart.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NegativeSubtotal`] if the subtotal is below zero.
    pub fn new<I, S>(subtotal: Decimal, product_ids: I) -> Result<Self, CartError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if subtotal < Decimal::ZERO {
            return Err(CartError::NegativeSubtotal);
        }

        Ok(Self {
            subtotal,
            product_ids: product_ids.into_iter().map(Into::into).collect(),
        })
    }

    /// Cart subtotal before any discount.
    pub fn subtotal(&self) -> Decimal {
        self.subtotal
    }

    /// Product ids in the cart. May be empty.
    pub fn product_ids(&self) -> &[String] {
        &self.product_ids
    }
}
