//! Test Helpers

use coupons::coupons::{AppliesTo, CouponKind};
use rust_decimal_macros::dec;
use testresult::TestResult;

use crate::domain::coupons::{data::NewCoupon, records::CouponUuid};

/// A 25% off coupon, capped at 50, valid from 2025 until the end of 2099.
pub(crate) fn new_coupon(code: &str) -> TestResult<NewCoupon> {
    Ok(NewCoupon {
        uuid: CouponUuid::new(),
        code: code.to_string(),
        kind: CouponKind::Percentage,
        value: dec!(25),
        min_purchase: None,
        max_discount: Some(dec!(50)),
        valid_from: "2025-01-01T00:00:00Z".parse()?,
        valid_until: "2099-12-31T23:59:59Z".parse()?,
        usage_limit: None,
        is_active: true,
        applies_to: AppliesTo::All,
        applicable_ids: Vec::new(),
    })
}
