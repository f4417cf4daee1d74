//! Eligibility
//!
//! Ordered checks deciding whether a coupon may be used against a cart at a
//! given moment. The first failing check wins.

use jiff::Timestamp;
use rust_decimal::Decimal;
use rustc_hash::FxHashSet;

use crate::{
    cart::CartContext,
    coupons::{AppliesTo, Coupon},
};

/// Why a coupon was turned down.
///
/// These are expected outcomes of evaluation, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionReason {
    /// The coupon has been switched off.
    Inactive,

    /// The evaluation time falls outside the validity window.
    OutsideWindow,

    /// Every allowed redemption has been used.
    UsageLimitReached,

    /// The cart subtotal is below the coupon minimum.
    MinimumNotMet {
        /// Subtotal required to use the coupon.
        minimum: Decimal,
    },

    /// None of the products in the cart are covered by the coupon.
    NotApplicable,
}

impl RejectionReason {
    /// Stable identifier, suitable for metric labels.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Inactive => "inactive",
            Self::OutsideWindow => "outside_window",
            Self::UsageLimitReached => "usage_limit_reached",
            Self::MinimumNotMet { .. } => "minimum_not_met",
            Self::NotApplicable => "not_applicable",
        }
    }
}

/// Outcome of the eligibility checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EligibilityOutcome {
    /// Every check passed.
    Eligible,

    /// A check failed.
    Rejected(RejectionReason),
}

/// Run the eligibility checks for `coupon` against `cart` at `now`.
pub fn check(coupon: &Coupon, cart: &CartContext, now: Timestamp) -> EligibilityOutcome {
    match first_rejection(coupon, cart, now) {
        Some(reason) => EligibilityOutcome::Rejected(reason),
        None => EligibilityOutcome::Eligible,
    }
}

fn first_rejection(coupon: &Coupon, cart: &CartContext, now: Timestamp) -> Option<RejectionReason> {
    if !coupon.is_active {
        return Some(RejectionReason::Inactive);
    }

    if !coupon.is_within_window(now) {
        return Some(RejectionReason::OutsideWindow);
    }

    if coupon.is_exhausted() {
        return Some(RejectionReason::UsageLimitReached);
    }

    if let Some(minimum) = coupon.min_purchase
        && cart.subtotal() < minimum
    {
        return Some(RejectionReason::MinimumNotMet { minimum });
    }

    if !is_applicable(coupon, cart) {
        return Some(RejectionReason::NotApplicable);
    }

    None
}

/// Applicability is only enforced when both the coupon and the cart list ids.
fn is_applicable(coupon: &Coupon, cart: &CartContext) -> bool {
    if coupon.applies_to == AppliesTo::All
        || coupon.applicable_ids.is_empty()
        || cart.product_ids().is_empty()
    {
        return true;
    }

    let applicable: FxHashSet<&str> = coupon.applicable_ids.iter().map(String::as_str).collect();

    cart.product_ids()
        .iter()
        .any(|id| applicable.contains(id.as_str()))
}
