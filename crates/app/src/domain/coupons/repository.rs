//! Coupons Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar};

use crate::domain::coupons::{
    data::{CouponFilter, NewCoupon, Pagination},
    records::{CouponRecord, CouponUuid},
};

const LIST_COUPONS_SQL: &str = include_str!("sql/list_coupons.sql");
const COUNT_COUPONS_SQL: &str = include_str!("sql/count_coupons.sql");
const GET_COUPON_SQL: &str = include_str!("sql/get_coupon.sql");
const GET_COUPON_FOR_UPDATE_SQL: &str = include_str!("sql/get_coupon_for_update.sql");
const GET_ACTIVE_COUPON_BY_CODE_SQL: &str = include_str!("sql/get_active_coupon_by_code.sql");
const CREATE_COUPON_SQL: &str = include_str!("sql/create_coupon.sql");
const UPDATE_COUPON_SQL: &str = include_str!("sql/update_coupon.sql");
const SET_COUPON_ACTIVE_SQL: &str = include_str!("sql/set_coupon_active.sql");
const DELETE_COUPON_SQL: &str = include_str!("sql/delete_coupon.sql");
const REDEEM_COUPON_SQL: &str = include_str!("sql/redeem_coupon.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCouponsRepository;

impl PgCouponsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn list_coupons(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        filter: &CouponFilter,
        pagination: Pagination,
    ) -> Result<Vec<CouponRecord>, sqlx::Error> {
        query_as::<Postgres, CouponRecord>(LIST_COUPONS_SQL)
            .bind(filter.is_active)
            .bind(filter.kind.map(|kind| kind.as_str()))
            .bind(filter.search.as_deref())
            .bind(i64::from(pagination.limit()))
            .bind(to_i64("offset", pagination.offset())?)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn count_coupons(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        filter: &CouponFilter,
    ) -> Result<u64, sqlx::Error> {
        let total: i64 = query_scalar(COUNT_COUPONS_SQL)
            .bind(filter.is_active)
            .bind(filter.kind.map(|kind| kind.as_str()))
            .bind(filter.search.as_deref())
            .fetch_one(&mut **tx)
            .await?;

        to_u64("count", total)
    }

    pub(crate) async fn get_coupon(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        coupon: CouponUuid,
    ) -> Result<CouponRecord, sqlx::Error> {
        query_as::<Postgres, CouponRecord>(GET_COUPON_SQL)
            .bind(coupon.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_coupon_for_update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        coupon: CouponUuid,
    ) -> Result<CouponRecord, sqlx::Error> {
        query_as::<Postgres, CouponRecord>(GET_COUPON_FOR_UPDATE_SQL)
            .bind(coupon.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn find_active_coupon_by_code(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        code: &str,
    ) -> Result<Option<CouponRecord>, sqlx::Error> {
        query_as::<Postgres, CouponRecord>(GET_ACTIVE_COUPON_BY_CODE_SQL)
            .bind(code)
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn create_coupon(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        coupon: NewCoupon,
    ) -> Result<CouponRecord, sqlx::Error> {
        let usage_limit = coupon
            .usage_limit
            .map(|limit| to_i64("usage_limit", limit))
            .transpose()?;

        query_as::<Postgres, CouponRecord>(CREATE_COUPON_SQL)
            .bind(coupon.uuid.into_uuid())
            .bind(coupon.code)
            .bind(coupon.kind.as_str())
            .bind(coupon.value)
            .bind(coupon.min_purchase)
            .bind(coupon.max_discount)
            .bind(SqlxTimestamp::from(coupon.valid_from))
            .bind(SqlxTimestamp::from(coupon.valid_until))
            .bind(usage_limit)
            .bind(coupon.is_active)
            .bind(coupon.applies_to.as_str())
            .bind(coupon.applicable_ids)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn update_coupon(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        coupon: CouponRecord,
    ) -> Result<CouponRecord, sqlx::Error> {
        let usage_limit = coupon
            .usage_limit
            .map(|limit| to_i64("usage_limit", limit))
            .transpose()?;

        query_as::<Postgres, CouponRecord>(UPDATE_COUPON_SQL)
            .bind(coupon.uuid.into_uuid())
            .bind(coupon.code)
            .bind(coupon.kind.as_str())
            .bind(coupon.value)
            .bind(coupon.min_purchase)
            .bind(coupon.max_discount)
            .bind(SqlxTimestamp::from(coupon.valid_from))
            .bind(SqlxTimestamp::from(coupon.valid_until))
            .bind(usage_limit)
            .bind(coupon.is_active)
            .bind(coupon.applies_to.as_str())
            .bind(coupon.applicable_ids)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn set_coupon_active(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        coupon: CouponUuid,
        is_active: bool,
    ) -> Result<CouponRecord, sqlx::Error> {
        query_as::<Postgres, CouponRecord>(SET_COUPON_ACTIVE_SQL)
            .bind(coupon.into_uuid())
            .bind(is_active)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn delete_coupon(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        coupon: CouponUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_COUPON_SQL)
            .bind(coupon.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    /// Increment the usage count of an active, unexhausted coupon.
    ///
    /// Returns `None` when no row qualified.
    pub(crate) async fn redeem_coupon(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        code: &str,
    ) -> Result<Option<CouponRecord>, sqlx::Error> {
        query_as::<Postgres, CouponRecord>(REDEEM_COUPON_SQL)
            .bind(code)
            .fetch_optional(&mut **tx)
            .await
    }
}

fn to_i64(column: &str, value: u64) -> Result<i64, sqlx::Error> {
    i64::try_from(value).map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

fn to_u64(column: &str, value: i64) -> Result<u64, sqlx::Error> {
    u64::try_from(value).map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

fn decode<T, E>(column: &str, value: Result<T, E>) -> Result<T, sqlx::Error>
where
    E: std::error::Error + Send + Sync + 'static,
{
    value.map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

impl<'r> FromRow<'r, PgRow> for CouponRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let kind: String = row.try_get("kind")?;
        let applies_to: String = row.try_get("applies_to")?;

        Ok(Self {
            uuid: CouponUuid::from_uuid(row.try_get("uuid")?),
            code: row.try_get("code")?,
            kind: decode("kind", kind.parse())?,
            value: row.try_get("value")?,
            min_purchase: row.try_get("min_purchase")?,
            max_discount: row.try_get("max_discount")?,
            valid_from: row.try_get::<SqlxTimestamp, _>("valid_from")?.to_jiff(),
            valid_until: row.try_get::<SqlxTimestamp, _>("valid_until")?.to_jiff(),
            usage_limit: row
                .try_get::<Option<i64>, _>("usage_limit")?
                .map(|limit| to_u64("usage_limit", limit))
                .transpose()?,
            usage_count: to_u64("usage_count", row.try_get("usage_count")?)?,
            is_active: row.try_get("is_active")?,
            applies_to: decode("applies_to", applies_to.parse())?,
            applicable_ids: row.try_get("applicable_ids")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
