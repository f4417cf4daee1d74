//! Coupons Prelude

pub use crate::{
    cart::{CartContext, CartError},
    coupons::{AppliesTo, Coupon, CouponKind, CouponTermsError, CouponValue},
    discounts::{Discount, DiscountError, compute_discount},
    eligibility::{EligibilityOutcome, RejectionReason, check},
    evaluation::{Evaluation, EvaluationError, evaluate},
};
