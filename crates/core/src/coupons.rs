//! Coupons
//!
//! Coupon snapshots as loaded from storage, and the kind-specific value each
//! coupon carries.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use jiff::Timestamp;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;
use uuid::Uuid;

/// Errors raised when coupon terms are malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CouponTermsError {
    /// The coupon code is empty or whitespace.
    #[error("coupon code must not be blank")]
    BlankCode,

    /// The coupon kind string is not recognised.
    #[error("unknown coupon kind {0:?}")]
    UnknownKind(String),

    /// The applicability scope string is not recognised.
    #[error("unknown applicability scope {0:?}")]
    UnknownScope(String),

    /// The coupon value is below zero.
    #[error("coupon value must not be negative")]
    NegativeValue,

    /// A percentage coupon is worth more than 100%.
    #[error("percentage must be between 0 and 100")]
    PercentageOutOfRange,

    /// A buy-x-get-y coupon grants a fractional or oversized item count.
    #[error("free item count must be a whole number")]
    InvalidQuantity,

    /// An optional monetary term is below zero.
    #[error("{0} must not be negative")]
    NegativeAmount(&'static str),

    /// The validity window ends before it starts.
    #[error("validity window ends before it starts")]
    InvertedWindow,

    /// More redemptions are recorded than the limit allows.
    #[error("usage count exceeds usage limit")]
    UsageCountExceedsLimit,
}

/// Coupon kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CouponKind {
    /// Percentage off the cart subtotal.
    #[serde(rename = "percentage")]
    Percentage,

    /// Fixed amount off the cart subtotal.
    #[serde(rename = "fixed")]
    FixedAmount,

    /// Shipping discount, applied by the caller against shipping cost.
    #[serde(rename = "shipping")]
    FreeShipping,

    /// Free items, applied by the caller against priced line items.
    #[serde(rename = "buyXgetY")]
    BuyXGetY,
}

impl CouponKind {
    /// Storage and wire representation of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Percentage => "percentage",
            Self::FixedAmount => "fixed",
            Self::FreeShipping => "shipping",
            Self::BuyXGetY => "buyXgetY",
        }
    }
}

impl Display for CouponKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for CouponKind {
    type Err = CouponTermsError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "percentage" => Ok(Self::Percentage),
            "fixed" => Ok(Self::FixedAmount),
            "shipping" => Ok(Self::FreeShipping),
            "buyXgetY" => Ok(Self::BuyXGetY),
            other => Err(CouponTermsError::UnknownKind(other.to_string())),
        }
    }
}

/// Which part of a cart a coupon may be applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppliesTo {
    /// Every product in the cart.
    All,

    /// Products in the listed categories.
    Categories,

    /// The listed products.
    Products,
}

impl AppliesTo {
    /// Storage and wire representation of the scope.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Categories => "categories",
            Self::Products => "products",
        }
    }
}

impl Display for AppliesTo {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppliesTo {
    type Err = CouponTermsError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "all" => Ok(Self::All),
            "categories" => Ok(Self::Categories),
            "products" => Ok(Self::Products),
            other => Err(CouponTermsError::UnknownScope(other.to_string())),
        }
    }
}

/// Kind-specific coupon value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CouponValue {
    /// Percentage off, in the range 0 to 100.
    Percentage(Decimal),

    /// Amount off the subtotal.
    FixedAmount(Decimal),

    /// Amount off shipping.
    FreeShipping(Decimal),

    /// Number of free items.
    BuyXGetY(u32),
}

impl CouponValue {
    /// Build a value from its stored kind and raw number.
    ///
    /// # Errors
    ///
    /// Returns a [`CouponTermsError`] if the number is negative, a percentage
    /// exceeds 100, or a free item count is not a whole number.
    pub fn from_parts(kind: CouponKind, value: Decimal) -> Result<Self, CouponTermsError> {
        if value < Decimal::ZERO {
            return Err(CouponTermsError::NegativeValue);
        }

        let coupon_value = match kind {
            CouponKind::Percentage => Self::Percentage(value),
            CouponKind::FixedAmount => Self::FixedAmount(value),
            CouponKind::FreeShipping => Self::FreeShipping(value),
            CouponKind::BuyXGetY => {
                if !value.fract().is_zero() {
                    return Err(CouponTermsError::InvalidQuantity);
                }

                Self::BuyXGetY(value.to_u32().ok_or(CouponTermsError::InvalidQuantity)?)
            }
        };

        coupon_value.validate()?;

        Ok(coupon_value)
    }

    /// Return the coupon kind.
    #[must_use]
    pub const fn kind(&self) -> CouponKind {
        match self {
            Self::Percentage(_) => CouponKind::Percentage,
            Self::FixedAmount(_) => CouponKind::FixedAmount,
            Self::FreeShipping(_) => CouponKind::FreeShipping,
            Self::BuyXGetY(_) => CouponKind::BuyXGetY,
        }
    }

    /// Return the raw number as stored and reported to callers.
    #[must_use]
    pub fn value(&self) -> Decimal {
        match *self {
            Self::Percentage(value) | Self::FixedAmount(value) | Self::FreeShipping(value) => value,
            Self::BuyXGetY(quantity) => Decimal::from(quantity),
        }
    }

    /// Check the value is within the range its kind allows.
    ///
    /// # Errors
    ///
    /// Returns a [`CouponTermsError`] if the value is negative or a percentage
    /// exceeds 100.
    pub fn validate(&self) -> Result<(), CouponTermsError> {
        match *self {
            Self::Percentage(percent) if percent > Decimal::ONE_HUNDRED => {
                Err(CouponTermsError::PercentageOutOfRange)
            }
            Self::Percentage(value) | Self::FixedAmount(value) | Self::FreeShipping(value)
                if value < Decimal::ZERO =>
            {
                Err(CouponTermsError::NegativeValue)
            }
            _ => Ok(()),
        }
    }
}

/// Coupon snapshot.
///
/// Loaded from storage at evaluation time and treated as read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct Coupon {
    /// Unique identifier.
    pub id: Uuid,

    /// Human-entered code, matched exactly as stored.
    pub code: String,

    /// Kind and kind-specific value.
    pub value: CouponValue,

    /// Subtotal floor required to use the coupon.
    pub min_purchase: Option<Decimal>,

    /// Cap on the computed discount; only percentage coupons are capped.
    pub max_discount: Option<Decimal>,

    /// Start of the active window, inclusive.
    pub valid_from: Timestamp,

    /// End of the active window, inclusive.
    pub valid_until: Timestamp,

    /// Total redemptions allowed across all users.
    pub usage_limit: Option<u64>,

    /// Redemptions recorded so far.
    pub usage_count: u64,

    /// Administrative kill-switch, independent of the date window.
    pub is_active: bool,

    /// Applicability scope.
    pub applies_to: AppliesTo,

    /// Product or category identifiers the coupon is restricted to.
    pub applicable_ids: SmallVec<[String; 4]>,
}

impl Coupon {
    /// Return the coupon kind.
    #[must_use]
    pub const fn kind(&self) -> CouponKind {
        self.value.kind()
    }

    /// Whether `now` falls inside the inclusive validity window.
    #[must_use]
    pub fn is_within_window(&self, now: Timestamp) -> bool {
        self.valid_from <= now && now <= self.valid_until
    }

    /// Whether the usage limit has been used up.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.usage_limit
            .is_some_and(|limit| self.usage_count >= limit)
    }

    /// Validate every term of the coupon, as required before it is stored.
    ///
    /// # Errors
    ///
    /// Returns the first [`CouponTermsError`] found.
    pub fn validate_terms(&self) -> Result<(), CouponTermsError> {
        if self.code.trim().is_empty() {
            return Err(CouponTermsError::BlankCode);
        }

        self.validate_amounts()?;

        if self.valid_from > self.valid_until {
            return Err(CouponTermsError::InvertedWindow);
        }

        if self
            .usage_limit
            .is_some_and(|limit| self.usage_count > limit)
        {
            return Err(CouponTermsError::UsageCountExceedsLimit);
        }

        Ok(())
    }

    /// Validate the value and the monetary terms a discount is computed from.
    ///
    /// # Errors
    ///
    /// Returns a [`CouponTermsError`] if the value is out of range, or the
    /// minimum purchase or maximum discount is negative.
    pub fn validate_amounts(&self) -> Result<(), CouponTermsError> {
        self.value.validate()?;

        if self.min_purchase.is_some_and(|amount| amount < Decimal::ZERO) {
            return Err(CouponTermsError::NegativeAmount("minimum purchase"));
        }

        if self.max_discount.is_some_and(|amount| amount < Decimal::ZERO) {
            return Err(CouponTermsError::NegativeAmount("maximum discount"));
        }

        Ok(())
    }
}
