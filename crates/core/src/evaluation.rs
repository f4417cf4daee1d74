//! Evaluation
//!
//! Runs the eligibility checks and, for eligible coupons, the discount
//! calculation. Never mutates the coupon; calling it any number of times
//! with the same inputs gives the same result.

use jiff::Timestamp;
use thiserror::Error;

use crate::{
    cart::CartContext,
    coupons::Coupon,
    discounts::{Discount, DiscountError, compute_discount},
    eligibility::{EligibilityOutcome, RejectionReason, check},
};

/// Errors raised by evaluation when its inputs are malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvaluationError {
    /// The coupon terms could not be turned into a discount.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] DiscountError),
}

/// Result of evaluating a coupon against a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluation {
    /// The coupon can be used and grants this discount.
    Valid(Discount),

    /// The coupon cannot be used.
    Rejected(RejectionReason),
}

impl Evaluation {
    /// Whether the coupon can be used.
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    /// The discount, when valid.
    pub fn discount(&self) -> Option<&Discount> {
        match self {
            Self::Valid(discount) => Some(discount),
            Self::Rejected(_) => None,
        }
    }

    /// The rejection reason, when rejected.
    pub fn rejection(&self) -> Option<RejectionReason> {
        match self {
            Self::Valid(_) => None,
            Self::Rejected(reason) => Some(*reason),
        }
    }
}

/// Evaluate `coupon` against `cart` at `now`.
///
/// # Errors
///
/// Returns [`EvaluationError::InvalidInput`] if an eligible coupon has terms
/// that cannot produce a discount.
pub fn evaluate(
    coupon: &Coupon,
    cart: &CartContext,
    now: Timestamp,
) -> Result<Evaluation, EvaluationError> {
    match check(coupon, cart, now) {
        EligibilityOutcome::Rejected(reason) => Ok(Evaluation::Rejected(reason)),
        EligibilityOutcome::Eligible => Ok(Evaluation::Valid(compute_discount(coupon, cart)?)),
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use smallvec::smallvec;
    use testresult::TestResult;
    use uuid::Uuid;

    use crate::coupons::{AppliesTo, CouponKind, CouponTermsError, CouponValue};

    use super::*;

    fn coupon(value: CouponValue) -> TestResult<Coupon> {
        Ok(Coupon {
            id: Uuid::nil(),
            code: "WELCOME".to_string(),
            value,
            min_purchase: None,
            max_discount: None,
            valid_from: "2025-01-01T00:00:00Z".parse()?,
            valid_until: "2025-12-31T00:00:00Z".parse()?,
            usage_limit: None,
            usage_count: 0,
            is_active: true,
            applies_to: AppliesTo::All,
            applicable_ids: smallvec![],
        })
    }

    #[test]
    fn valid_evaluation_exposes_the_discount() -> TestResult {
        let coupon = coupon(CouponValue::FixedAmount(dec!(10)))?;
        let cart = CartContext::new(dec!(50), ["1"])?;

        let evaluation = evaluate(&coupon, &cart, "2025-06-01T00:00:00Z".parse()?)?;

        assert!(evaluation.is_valid(), "expected a valid evaluation");
        assert_eq!(evaluation.rejection(), None);
        assert_eq!(
            evaluation.discount(),
            Some(&Discount {
                kind: CouponKind::FixedAmount,
                value: dec!(10),
                amount: dec!(10),
            })
        );

        Ok(())
    }

    #[test]
    fn rejected_evaluation_exposes_the_reason() -> TestResult {
        let coupon = coupon(CouponValue::FixedAmount(dec!(10)))?;
        let cart = CartContext::new(dec!(50), ["1"])?;

        let evaluation = evaluate(&coupon, &cart, "2026-06-01T00:00:00Z".parse()?)?;

        assert!(!evaluation.is_valid(), "expected a rejected evaluation");
        assert_eq!(evaluation.discount(), None);
        assert_eq!(evaluation.rejection(), Some(RejectionReason::OutsideWindow));

        Ok(())
    }

    #[test]
    fn invalid_terms_surface_as_invalid_input() -> TestResult {
        let coupon = coupon(CouponValue::Percentage(dec!(101)))?;
        let cart = CartContext::new(dec!(50), ["1"])?;

        let result = evaluate(&coupon, &cart, "2025-06-01T00:00:00Z".parse()?);

        assert_eq!(
            result,
            Err(EvaluationError::InvalidInput(DiscountError::InvalidTerms(
                CouponTermsError::PercentageOutOfRange
            )))
        );

        Ok(())
    }

    #[test]
    fn invalid_terms_are_not_reported_for_inactive_coupons() -> TestResult {
        let mut coupon = coupon(CouponValue::Percentage(dec!(101)))?;

        coupon.is_active = false;

        let cart = CartContext::new(dec!(50), ["1"])?;
        let evaluation = evaluate(&coupon, &cart, "2025-06-01T00:00:00Z".parse()?)?;

        assert_eq!(evaluation, Evaluation::Rejected(RejectionReason::Inactive));

        Ok(())
    }
}
