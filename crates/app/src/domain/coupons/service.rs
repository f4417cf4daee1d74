//! Coupons Service

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use tracing::{Span, info};

use crate::{
    database::Db,
    domain::coupons::{
        CouponsServiceError,
        data::{CouponFilter, CouponPage, CouponUpdate, NewCoupon, Pagination},
        records::{CouponRecord, CouponUuid},
        repository::PgCouponsRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgCouponsService {
    db: Db,
    repository: PgCouponsRepository,
}

impl PgCouponsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgCouponsRepository::new(),
        }
    }
}

#[async_trait]
impl CouponsService for PgCouponsService {
    #[tracing::instrument(
        name = "coupons.service.list_coupons",
        skip(self, filter),
        fields(
            page = pagination.page(),
            limit = pagination.limit(),
            total = tracing::field::Empty
        ),
        err
    )]
    async fn list_coupons(
        &self,
        filter: CouponFilter,
        pagination: Pagination,
    ) -> Result<CouponPage, CouponsServiceError> {
        let mut tx = self.db.begin().await?;

        let total = self.repository.count_coupons(&mut tx, &filter).await?;

        let coupons = self
            .repository
            .list_coupons(&mut tx, &filter, pagination)
            .await?;

        tx.commit().await?;

        Span::current().record("total", total);

        Ok(CouponPage {
            coupons,
            total,
            page: pagination.page(),
            limit: pagination.limit(),
            pages: pagination.pages(total),
        })
    }

    #[tracing::instrument(
        name = "coupons.service.get_coupon",
        skip(self),
        fields(coupon_uuid = %coupon),
        err
    )]
    async fn get_coupon(&self, coupon: CouponUuid) -> Result<CouponRecord, CouponsServiceError> {
        let mut tx = self.db.begin().await?;

        let record = self.repository.get_coupon(&mut tx, coupon).await?;

        tx.commit().await?;

        Ok(record)
    }

    #[tracing::instrument(name = "coupons.service.get_active_coupon_by_code", skip(self), err)]
    async fn get_active_coupon_by_code(
        &self,
        code: &str,
    ) -> Result<CouponRecord, CouponsServiceError> {
        let mut tx = self.db.begin().await?;

        let record = self
            .repository
            .find_active_coupon_by_code(&mut tx, code)
            .await?
            .ok_or(CouponsServiceError::NotFound)?;

        tx.commit().await?;

        Ok(record)
    }

    #[tracing::instrument(
        name = "coupons.service.create_coupon",
        skip(self, coupon),
        fields(coupon_uuid = %coupon.uuid, coupon_kind = %coupon.kind),
        err
    )]
    async fn create_coupon(&self, coupon: NewCoupon) -> Result<CouponRecord, CouponsServiceError> {
        coupon.validate()?;

        let mut tx = self.db.begin().await?;

        let record = self.repository.create_coupon(&mut tx, coupon).await?;

        tx.commit().await?;

        info!(coupon_uuid = %record.uuid, code = %record.code, "created coupon");

        Ok(record)
    }

    #[tracing::instrument(
        name = "coupons.service.update_coupon",
        skip(self, update),
        fields(coupon_uuid = %coupon),
        err
    )]
    async fn update_coupon(
        &self,
        coupon: CouponUuid,
        update: CouponUpdate,
    ) -> Result<CouponRecord, CouponsServiceError> {
        let mut tx = self.db.begin().await?;

        let existing = self
            .repository
            .get_coupon_for_update(&mut tx, coupon)
            .await?;

        let merged = update.apply(existing);

        merged.to_coupon()?.validate_terms()?;

        let record = self.repository.update_coupon(&mut tx, merged).await?;

        tx.commit().await?;

        info!(coupon_uuid = %record.uuid, "updated coupon");

        Ok(record)
    }

    #[tracing::instrument(
        name = "coupons.service.delete_coupon",
        skip(self),
        fields(coupon_uuid = %coupon),
        err
    )]
    async fn delete_coupon(&self, coupon: CouponUuid) -> Result<(), CouponsServiceError> {
        let mut tx = self.db.begin().await?;

        let rows_affected = self.repository.delete_coupon(&mut tx, coupon).await?;

        if rows_affected == 0 {
            return Err(CouponsServiceError::NotFound);
        }

        tx.commit().await?;

        info!(coupon_uuid = %coupon, "deleted coupon");

        Ok(())
    }

    #[tracing::instrument(
        name = "coupons.service.set_coupon_active",
        skip(self),
        fields(coupon_uuid = %coupon),
        err
    )]
    async fn set_coupon_active(
        &self,
        coupon: CouponUuid,
        is_active: bool,
    ) -> Result<CouponRecord, CouponsServiceError> {
        let mut tx = self.db.begin().await?;

        let record = self
            .repository
            .set_coupon_active(&mut tx, coupon, is_active)
            .await?;

        tx.commit().await?;

        info!(coupon_uuid = %coupon, is_active, "changed coupon status");

        Ok(record)
    }

    #[tracing::instrument(
        name = "coupons.service.redeem_coupon",
        skip(self),
        fields(usage_count = tracing::field::Empty),
        err
    )]
    async fn redeem_coupon(&self, code: &str) -> Result<CouponRecord, CouponsServiceError> {
        let mut tx = self.db.begin().await?;

        let Some(record) = self.repository.redeem_coupon(&mut tx, code).await? else {
            let active = self
                .repository
                .find_active_coupon_by_code(&mut tx, code)
                .await?;

            let now = Timestamp::now();

            return Err(match active {
                None => CouponsServiceError::NotFound,
                Some(coupon) if now < coupon.valid_from || now > coupon.valid_until => {
                    CouponsServiceError::OutsideWindow
                }
                Some(_) => CouponsServiceError::UsageLimitReached,
            });
        };

        tx.commit().await?;

        Span::current().record("usage_count", record.usage_count);

        Ok(record)
    }
}

#[automock]
#[async_trait]
pub trait CouponsService: Send + Sync {
    /// Retrieve one page of coupons matching the filter, newest first.
    async fn list_coupons(
        &self,
        filter: CouponFilter,
        pagination: Pagination,
    ) -> Result<CouponPage, CouponsServiceError>;

    /// Retrieve a single coupon.
    async fn get_coupon(&self, coupon: CouponUuid) -> Result<CouponRecord, CouponsServiceError>;

    /// Retrieve the active coupon with exactly this code.
    async fn get_active_coupon_by_code(
        &self,
        code: &str,
    ) -> Result<CouponRecord, CouponsServiceError>;

    /// Create a coupon with no recorded redemptions.
    async fn create_coupon(&self, coupon: NewCoupon) -> Result<CouponRecord, CouponsServiceError>;

    /// Apply a partial update to a coupon.
    async fn update_coupon(
        &self,
        coupon: CouponUuid,
        update: CouponUpdate,
    ) -> Result<CouponRecord, CouponsServiceError>;

    /// Delete a coupon.
    async fn delete_coupon(&self, coupon: CouponUuid) -> Result<(), CouponsServiceError>;

    /// Switch a coupon on or off.
    async fn set_coupon_active(
        &self,
        coupon: CouponUuid,
        is_active: bool,
    ) -> Result<CouponRecord, CouponsServiceError>;

    /// Record one redemption of an active coupon inside its validity window,
    /// unless the usage limit is used up.
    async fn redeem_coupon(&self, code: &str) -> Result<CouponRecord, CouponsServiceError>;
}

#[cfg(test)]
mod tests {
    use coupons::coupons::{AppliesTo, CouponKind, CouponTermsError};
    use rust_decimal_macros::dec;
    use testresult::TestResult;

    use crate::test::{TestContext, helpers::new_coupon};

    use super::*;

    #[tokio::test]
    async fn create_coupon_starts_with_no_redemptions() -> TestResult {
        let ctx = TestContext::new().await;
        let coupon = new_coupon("SUMMER25")?;
        let uuid = coupon.uuid;

        let record = ctx.coupons.create_coupon(coupon).await?;

        assert_eq!(record.uuid, uuid);
        assert_eq!(record.code, "SUMMER25");
        assert_eq!(record.kind, CouponKind::Percentage);
        assert_eq!(record.value, dec!(25));
        assert_eq!(record.usage_count, 0);
        assert!(record.is_active, "new coupons should be active");

        Ok(())
    }

    #[tokio::test]
    async fn create_coupon_duplicate_code_returns_already_exists() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.coupons.create_coupon(new_coupon("DUPLICATE")?).await?;

        let result = ctx.coupons.create_coupon(new_coupon("DUPLICATE")?).await;

        assert!(
            matches!(result, Err(CouponsServiceError::AlreadyExists)),
            "expected AlreadyExists, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn create_coupon_rejects_inverted_window() -> TestResult {
        let ctx = TestContext::new().await;
        let mut coupon = new_coupon("BACKWARDS")?;

        coupon.valid_until = "2024-01-01T00:00:00Z".parse()?;

        let result = ctx.coupons.create_coupon(coupon).await;

        assert!(
            matches!(
                result,
                Err(CouponsServiceError::InvalidTerms(
                    CouponTermsError::InvertedWindow
                ))
            ),
            "expected InvalidTerms, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn get_coupon_unknown_uuid_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx.coupons.get_coupon(CouponUuid::new()).await;

        assert!(
            matches!(result, Err(CouponsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn get_active_coupon_by_code_ignores_inactive_coupons() -> TestResult {
        let ctx = TestContext::new().await;
        let record = ctx.coupons.create_coupon(new_coupon("SLEEPY")?).await?;

        let found = ctx.coupons.get_active_coupon_by_code("SLEEPY").await?;

        assert_eq!(found.uuid, record.uuid);

        ctx.coupons.set_coupon_active(record.uuid, false).await?;

        let result = ctx.coupons.get_active_coupon_by_code("SLEEPY").await;

        assert!(
            matches!(result, Err(CouponsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn get_active_coupon_by_code_is_exact() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.coupons.create_coupon(new_coupon("CaseSensitive")?).await?;

        let result = ctx.coupons.get_active_coupon_by_code("casesensitive").await;

        assert!(
            matches!(result, Err(CouponsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn list_coupons_filters_and_paginates() -> TestResult {
        let ctx = TestContext::new().await;

        for code in ["SPRING5", "SPRING10", "SPRING15"] {
            ctx.coupons.create_coupon(new_coupon(code)?).await?;
        }

        let mut fixed = new_coupon("FLAT20")?;

        fixed.kind = CouponKind::FixedAmount;
        fixed.value = dec!(20);

        ctx.coupons.create_coupon(fixed).await?;

        let page = ctx
            .coupons
            .list_coupons(
                CouponFilter {
                    search: Some("spring".to_string()),
                    ..CouponFilter::default()
                },
                Pagination::new(Some(1), Some(2)),
            )
            .await?;

        assert_eq!(page.total, 3);
        assert_eq!(page.pages, 2);
        assert_eq!(page.coupons.len(), 2);
        assert_eq!(page.coupons.first().map(|c| c.code.as_str()), Some("SPRING15"));

        let fixed_only = ctx
            .coupons
            .list_coupons(
                CouponFilter {
                    kind: Some(CouponKind::FixedAmount),
                    ..CouponFilter::default()
                },
                Pagination::default(),
            )
            .await?;

        assert_eq!(fixed_only.total, 1);
        assert_eq!(fixed_only.coupons.first().map(|c| c.code.as_str()), Some("FLAT20"));

        Ok(())
    }

    #[tokio::test]
    async fn update_coupon_changes_only_given_fields() -> TestResult {
        let ctx = TestContext::new().await;
        let mut coupon = new_coupon("PARTIAL")?;

        coupon.min_purchase = Some(dec!(100));
        coupon.applies_to = AppliesTo::Products;
        coupon.applicable_ids = vec!["5".to_string()];

        let record = ctx.coupons.create_coupon(coupon).await?;

        let updated = ctx
            .coupons
            .update_coupon(
                record.uuid,
                CouponUpdate {
                    value: Some(dec!(30)),
                    min_purchase: Some(None),
                    ..CouponUpdate::default()
                },
            )
            .await?;

        assert_eq!(updated.value, dec!(30));
        assert_eq!(updated.min_purchase, None);
        assert_eq!(updated.max_discount, record.max_discount);
        assert_eq!(updated.applies_to, AppliesTo::Products);
        assert_eq!(updated.applicable_ids, vec!["5".to_string()]);
        assert!(updated.updated_at >= record.updated_at, "updated_at should move forward");

        Ok(())
    }

    #[tokio::test]
    async fn update_coupon_to_taken_code_returns_already_exists() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.coupons.create_coupon(new_coupon("TAKEN")?).await?;

        let record = ctx.coupons.create_coupon(new_coupon("OTHER")?).await?;

        let result = ctx
            .coupons
            .update_coupon(
                record.uuid,
                CouponUpdate {
                    code: Some("TAKEN".to_string()),
                    ..CouponUpdate::default()
                },
            )
            .await;

        assert!(
            matches!(result, Err(CouponsServiceError::AlreadyExists)),
            "expected AlreadyExists, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn update_coupon_unknown_uuid_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx
            .coupons
            .update_coupon(CouponUuid::new(), CouponUpdate::default())
            .await;

        assert!(
            matches!(result, Err(CouponsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn delete_coupon_makes_it_not_found() -> TestResult {
        let ctx = TestContext::new().await;
        let record = ctx.coupons.create_coupon(new_coupon("GONE")?).await?;

        ctx.coupons.delete_coupon(record.uuid).await?;

        let result = ctx.coupons.get_coupon(record.uuid).await;

        assert!(
            matches!(result, Err(CouponsServiceError::NotFound)),
            "expected NotFound after deletion, got {result:?}"
        );

        let result = ctx.coupons.delete_coupon(record.uuid).await;

        assert!(
            matches!(result, Err(CouponsServiceError::NotFound)),
            "expected NotFound on second deletion, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn redeem_coupon_stops_at_the_usage_limit() -> TestResult {
        let ctx = TestContext::new().await;
        let mut coupon = new_coupon("LIMITED")?;

        coupon.usage_limit = Some(2);

        ctx.coupons.create_coupon(coupon).await?;

        assert_eq!(ctx.coupons.redeem_coupon("LIMITED").await?.usage_count, 1);
        assert_eq!(ctx.coupons.redeem_coupon("LIMITED").await?.usage_count, 2);

        let result = ctx.coupons.redeem_coupon("LIMITED").await;

        assert!(
            matches!(result, Err(CouponsServiceError::UsageLimitReached)),
            "expected UsageLimitReached, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn concurrent_redemptions_never_exceed_the_limit() -> TestResult {
        let ctx = TestContext::new().await;
        let mut coupon = new_coupon("RACE")?;

        coupon.usage_limit = Some(3);

        let record = ctx.coupons.create_coupon(coupon).await?;

        let attempts = (0..10).map(|_| {
            let service = ctx.coupons.clone();

            tokio::spawn(async move { service.redeem_coupon("RACE").await })
        });

        let mut redeemed = 0;

        for attempt in attempts.collect::<Vec<_>>() {
            if attempt.await?.is_ok() {
                redeemed += 1;
            }
        }

        assert_eq!(redeemed, 3);
        assert_eq!(ctx.coupons.get_coupon(record.uuid).await?.usage_count, 3);

        Ok(())
    }

    #[tokio::test]
    async fn redeem_expired_coupon_leaves_usage_untouched() -> TestResult {
        let ctx = TestContext::new().await;
        let mut coupon = new_coupon("BYGONE")?;

        coupon.valid_from = "2020-01-01T00:00:00Z".parse()?;
        coupon.valid_until = "2020-12-31T23:59:59Z".parse()?;

        let record = ctx.coupons.create_coupon(coupon).await?;

        let result = ctx.coupons.redeem_coupon("BYGONE").await;

        assert!(
            matches!(result, Err(CouponsServiceError::OutsideWindow)),
            "expected OutsideWindow, got {result:?}"
        );
        assert_eq!(ctx.coupons.get_coupon(record.uuid).await?.usage_count, 0);

        Ok(())
    }

    #[tokio::test]
    async fn redeem_coupon_before_its_window_opens_is_rejected() -> TestResult {
        let ctx = TestContext::new().await;
        let mut coupon = new_coupon("SOON")?;

        coupon.valid_from = "2098-01-01T00:00:00Z".parse()?;

        ctx.coupons.create_coupon(coupon).await?;

        let result = ctx.coupons.redeem_coupon("SOON").await;

        assert!(
            matches!(result, Err(CouponsServiceError::OutsideWindow)),
            "expected OutsideWindow, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn redeem_unknown_code_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx.coupons.redeem_coupon("NOPE").await;

        assert!(
            matches!(result, Err(CouponsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }
}
