//! Discounts
//!
//! Monetary effect of a coupon that has passed eligibility. Amounts are kept
//! at full decimal precision here; rounding to a currency's minor unit only
//! happens when a discount is presented.

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, RoundingStrategy};
use rusty_money::iso::Currency;
use serde::Serialize;
use thiserror::Error;

use crate::{
    cart::CartContext,
    coupons::{Coupon, CouponKind, CouponTermsError, CouponValue},
};

/// Errors specific to discount calculations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiscountError {
    /// The coupon terms are out of range.
    #[error(transparent)]
    InvalidTerms(#[from] CouponTermsError),

    /// Percentage calculation overflowed.
    #[error("percentage calculation overflowed")]
    PercentConversion,
}

/// Discount granted by an eligible coupon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Discount {
    /// Coupon kind.
    pub kind: CouponKind,

    /// Raw coupon value: the percent, the amount, or the free item count.
    pub value: Decimal,

    /// Amount taken off the subtotal.
    pub amount: Decimal,
}

impl Discount {
    /// Amount rounded to the minor unit of `currency`.
    #[must_use]
    pub fn rounded_for(&self, currency: &Currency) -> Decimal {
        self.amount
            .round_dp_with_strategy(currency.exponent, RoundingStrategy::MidpointAwayFromZero)
    }
}

/// Calculate the discount `coupon` grants against `cart`.
///
/// Only call this once the coupon has been found eligible.
///
/// # Errors
///
/// Returns an error if the coupon terms are out of range, or the percentage
/// calculation overflows.
pub fn compute_discount(coupon: &Coupon, cart: &CartContext) -> Result<Discount, DiscountError> {
    coupon.validate_amounts()?;

    let subtotal = cart.subtotal();

    let amount = match coupon.value {
        CouponValue::Percentage(percent) => {
            let amount = percent_of(percent, subtotal)?;

            match coupon.max_discount {
                Some(cap) if amount > cap => cap,
                _ => amount,
            }
        }
        CouponValue::FixedAmount(value) => value.min(subtotal),
        // Applied by the caller against shipping cost or priced line items.
        CouponValue::FreeShipping(_) | CouponValue::BuyXGetY(_) => Decimal::ZERO,
    };

    Ok(Discount {
        kind: coupon.kind(),
        value: coupon.value.value(),
        amount,
    })
}

/// Calculate `percent` (0 to 100) of `amount`.
///
/// # Errors
///
/// Returns [`DiscountError::PercentConversion`] if the multiplication
/// overflows.
pub fn percent_of(percent: Decimal, amount: Decimal) -> Result<Decimal, DiscountError> {
    let fraction = percent
        .checked_div(Decimal::ONE_HUNDRED)
        .ok_or(DiscountError::PercentConversion)?;

    // Percentage only exposes its inner decimal through multiplication.
    (Percentage::from(fraction) * Decimal::ONE)
        .checked_mul(amount)
        .ok_or(DiscountError::PercentConversion)
}
