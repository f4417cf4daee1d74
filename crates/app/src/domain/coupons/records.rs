//! Coupon Records

use coupons::coupons::{AppliesTo, Coupon, CouponKind, CouponTermsError, CouponValue};
use jiff::Timestamp;
use rust_decimal::Decimal;

use crate::uuids::TypedUuid;

/// Coupon UUID
pub type CouponUuid = TypedUuid<CouponRecord>;

/// Coupon Record
#[derive(Debug, Clone, PartialEq)]
pub struct CouponRecord {
    pub uuid: CouponUuid,
    pub code: String,
    pub kind: CouponKind,
    pub value: Decimal,
    pub min_purchase: Option<Decimal>,
    pub max_discount: Option<Decimal>,
    pub valid_from: Timestamp,
    pub valid_until: Timestamp,
    pub usage_limit: Option<u64>,
    pub usage_count: u64,
    pub is_active: bool,
    pub applies_to: AppliesTo,
    pub applicable_ids: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CouponRecord {
    /// Build the snapshot the evaluation engine works on.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored value does not fit the coupon kind.
    pub fn to_coupon(&self) -> Result<Coupon, CouponTermsError> {
        Ok(Coupon {
            id: self.uuid.into_uuid(),
            code: self.code.clone(),
            value: CouponValue::from_parts(self.kind, self.value)?,
            min_purchase: self.min_purchase,
            max_discount: self.max_discount,
            valid_from: self.valid_from,
            valid_until: self.valid_until,
            usage_limit: self.usage_limit,
            usage_count: self.usage_count,
            is_active: self.is_active,
            applies_to: self.applies_to,
            applicable_ids: self.applicable_ids.iter().cloned().collect(),
        })
    }
}
