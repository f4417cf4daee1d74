//! Coupons Data

use coupons::coupons::{AppliesTo, Coupon, CouponKind, CouponTermsError, CouponValue};
use jiff::Timestamp;
use rust_decimal::Decimal;

use crate::domain::coupons::records::{CouponRecord, CouponUuid};

/// Page used when none, or a non-positive one, is requested.
pub const DEFAULT_PAGE: u32 = 1;

/// Page size used when none, or a non-positive one, is requested.
pub const DEFAULT_LIMIT: u32 = 10;

/// Largest page size served.
pub const MAX_LIMIT: u32 = 100;

/// New Coupon Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewCoupon {
    pub uuid: CouponUuid,
    pub code: String,
    pub kind: CouponKind,
    pub value: Decimal,
    pub min_purchase: Option<Decimal>,
    pub max_discount: Option<Decimal>,
    pub valid_from: Timestamp,
    pub valid_until: Timestamp,
    pub usage_limit: Option<u64>,
    pub is_active: bool,
    pub applies_to: AppliesTo,
    pub applicable_ids: Vec<String>,
}

impl NewCoupon {
    /// Check the coupon terms before they are stored.
    ///
    /// # Errors
    ///
    /// Returns the first [`CouponTermsError`] found.
    pub fn validate(&self) -> Result<(), CouponTermsError> {
        Coupon {
            id: self.uuid.into_uuid(),
            code: self.code.clone(),
            value: CouponValue::from_parts(self.kind, self.value)?,
            min_purchase: self.min_purchase,
            max_discount: self.max_discount,
            valid_from: self.valid_from,
            valid_until: self.valid_until,
            usage_limit: self.usage_limit,
            usage_count: 0,
            is_active: self.is_active,
            applies_to: self.applies_to,
            applicable_ids: self.applicable_ids.iter().cloned().collect(),
        }
        .validate_terms()
    }
}

/// Coupon Update Data
///
/// `None` keeps the stored value. For the nullable terms, `Some(None)`
/// clears the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CouponUpdate {
    pub code: Option<String>,
    pub kind: Option<CouponKind>,
    pub value: Option<Decimal>,
    pub min_purchase: Option<Option<Decimal>>,
    pub max_discount: Option<Option<Decimal>>,
    pub valid_from: Option<Timestamp>,
    pub valid_until: Option<Timestamp>,
    pub usage_limit: Option<Option<u64>>,
    pub is_active: Option<bool>,
    pub applies_to: Option<AppliesTo>,
    pub applicable_ids: Option<Vec<String>>,
}

impl CouponUpdate {
    /// Merge the update over an existing record.
    #[must_use]
    pub fn apply(self, record: CouponRecord) -> CouponRecord {
        CouponRecord {
            code: self.code.unwrap_or(record.code),
            kind: self.kind.unwrap_or(record.kind),
            value: self.value.unwrap_or(record.value),
            min_purchase: self.min_purchase.unwrap_or(record.min_purchase),
            max_discount: self.max_discount.unwrap_or(record.max_discount),
            valid_from: self.valid_from.unwrap_or(record.valid_from),
            valid_until: self.valid_until.unwrap_or(record.valid_until),
            usage_limit: self.usage_limit.unwrap_or(record.usage_limit),
            is_active: self.is_active.unwrap_or(record.is_active),
            applies_to: self.applies_to.unwrap_or(record.applies_to),
            applicable_ids: self.applicable_ids.unwrap_or(record.applicable_ids),
            ..record
        }
    }
}

/// Coupon list filters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CouponFilter {
    pub is_active: Option<bool>,
    pub kind: Option<CouponKind>,

    /// Case-insensitive substring of the coupon code.
    pub search: Option<String>,
}

/// Page selection for coupon listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: u32,
    limit: u32,
}

impl Pagination {
    /// Build a page selection from raw request values.
    ///
    /// Missing or non-positive values fall back to the defaults and the page
    /// size is capped at [`MAX_LIMIT`].
    #[must_use]
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        let page = page
            .filter(|page| *page > 0)
            .and_then(|page| u32::try_from(page).ok())
            .unwrap_or(DEFAULT_PAGE);

        let limit = limit
            .filter(|limit| *limit > 0)
            .map_or(DEFAULT_LIMIT, |limit| {
                u32::try_from(limit).map_or(MAX_LIMIT, |limit| limit.min(MAX_LIMIT))
            });

        Self { page, limit }
    }

    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of rows skipped before this page.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    /// Number of pages needed to hold `total` rows.
    #[must_use]
    pub fn pages(&self, total: u64) -> u64 {
        total.div_ceil(u64::from(self.limit))
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// One page of coupons
#[derive(Debug, Clone, PartialEq)]
pub struct CouponPage {
    pub coupons: Vec<CouponRecord>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub pages: u64,
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use testresult::TestResult;

    use super::*;

    fn new_coupon() -> TestResult<NewCoupon> {
        Ok(NewCoupon {
            uuid: CouponUuid::new(),
            code: "WELCOME10".to_string(),
            kind: CouponKind::Percentage,
            value: dec!(10),
            min_purchase: None,
            max_discount: Some(dec!(20)),
            valid_from: "2025-01-01T00:00:00Z".parse()?,
            valid_until: "2025-12-31T00:00:00Z".parse()?,
            usage_limit: None,
            is_active: true,
            applies_to: AppliesTo::All,
            applicable_ids: Vec::new(),
        })
    }

    #[test]
    fn pagination_defaults_when_missing() {
        let pagination = Pagination::new(None, None);

        assert_eq!(pagination.page(), 1);
        assert_eq!(pagination.limit(), 10);
        assert_eq!(pagination.offset(), 0);
    }

    #[test]
    fn pagination_defaults_when_not_positive() {
        let pagination = Pagination::new(Some(0), Some(-5));

        assert_eq!(pagination, Pagination::default());
    }

    #[test]
    fn pagination_caps_the_limit() {
        let pagination = Pagination::new(Some(3), Some(1_000));

        assert_eq!(pagination.limit(), MAX_LIMIT);
        assert_eq!(pagination.offset(), 200);
    }

    #[test]
    fn pages_rounds_up() {
        let pagination = Pagination::new(Some(1), Some(10));

        assert_eq!(pagination.pages(0), 0);
        assert_eq!(pagination.pages(10), 1);
        assert_eq!(pagination.pages(11), 2);
    }

    #[test]
    fn new_coupon_validation_rejects_blank_code() -> TestResult {
        let mut coupon = new_coupon()?;

        coupon.code = "   ".to_string();

        assert_eq!(coupon.validate(), Err(CouponTermsError::BlankCode));

        Ok(())
    }

    #[test]
    fn new_coupon_validation_rejects_large_percentage() -> TestResult {
        let mut coupon = new_coupon()?;

        coupon.value = dec!(120);

        assert_eq!(
            coupon.validate(),
            Err(CouponTermsError::PercentageOutOfRange)
        );

        Ok(())
    }

    #[test]
    fn update_keeps_absent_fields_and_clears_nullable_ones() -> TestResult {
        let coupon = new_coupon()?;

        let record = CouponRecord {
            uuid: coupon.uuid,
            code: coupon.code,
            kind: coupon.kind,
            value: coupon.value,
            min_purchase: Some(dec!(50)),
            max_discount: coupon.max_discount,
            valid_from: coupon.valid_from,
            valid_until: coupon.valid_until,
            usage_limit: Some(5),
            usage_count: 1,
            is_active: true,
            applies_to: coupon.applies_to,
            applicable_ids: coupon.applicable_ids,
            created_at: Timestamp::now(),
            updated_at: Timestamp::now(),
        };

        let updated = CouponUpdate {
            value: Some(dec!(15)),
            min_purchase: Some(None),
            ..CouponUpdate::default()
        }
        .apply(record.clone());

        assert_eq!(updated.value, dec!(15));
        assert_eq!(updated.min_purchase, None);
        assert_eq!(updated.max_discount, Some(dec!(20)));
        assert_eq!(updated.usage_limit, Some(5));
        assert_eq!(updated.usage_count, 1);
        assert_eq!(updated.code, record.code);

        Ok(())
    }
}
