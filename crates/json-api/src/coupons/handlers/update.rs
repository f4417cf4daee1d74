//! Update Coupon Handler

use std::{str::FromStr, sync::Arc};

use rust_decimal::Decimal;
use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use coupons::coupons::{AppliesTo, CouponKind};
use coupons_app::domain::coupons::{data::CouponUpdate, records::CouponUuid};

use crate::{
    coupons::{
        errors::into_status_error,
        get::CouponEnvelope,
        requests::{ProductId, invalid, nullable, parse_timestamp, present, to_decimal},
    },
    extensions::*,
    state::State,
};

/// Update Coupon Request
///
/// Missing fields are left unchanged. `minPurchase`, `maxDiscount` and
/// `usageLimit` are cleared by sending `null`.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdateCouponRequest {
    pub code: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub value: Option<f64>,
    #[serde(default, deserialize_with = "nullable")]
    #[salvo(schema(value_type = Option<f64>))]
    pub min_purchase: Option<Option<f64>>,
    #[serde(default, deserialize_with = "nullable")]
    #[salvo(schema(value_type = Option<f64>))]
    pub max_discount: Option<Option<f64>>,
    pub valid_from: Option<String>,
    pub valid_until: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    #[salvo(schema(value_type = Option<u64>))]
    pub usage_limit: Option<Option<u64>>,
    pub is_active: Option<bool>,
    pub applies_to: Option<String>,
    pub applicable_ids: Option<Vec<ProductId>>,
}

fn nullable_decimal(
    value: Option<Option<f64>>,
    field: &str,
) -> Result<Option<Option<Decimal>>, StatusError> {
    value
        .map(|amount| amount.map(|amount| to_decimal(amount, field)).transpose())
        .transpose()
}

impl TryFrom<UpdateCouponRequest> for CouponUpdate {
    type Error = StatusError;

    fn try_from(request: UpdateCouponRequest) -> Result<Self, Self::Error> {
        Ok(CouponUpdate {
            code: present(request.code),
            kind: present(request.kind)
                .map(|kind| CouponKind::from_str(&kind))
                .transpose()
                .map_err(invalid)?,
            value: request
                .value
                .map(|value| to_decimal(value, "value"))
                .transpose()?,
            min_purchase: nullable_decimal(request.min_purchase, "minPurchase")?,
            max_discount: nullable_decimal(request.max_discount, "maxDiscount")?,
            valid_from: present(request.valid_from)
                .map(|value| parse_timestamp(&value, "validFrom"))
                .transpose()?,
            valid_until: present(request.valid_until)
                .map(|value| parse_timestamp(&value, "validUntil"))
                .transpose()?,
            usage_limit: request.usage_limit,
            is_active: request.is_active,
            applies_to: present(request.applies_to)
                .map(|scope| AppliesTo::from_str(&scope))
                .transpose()
                .map_err(invalid)?,
            applicable_ids: request
                .applicable_ids
                .map(|ids| ids.into_iter().map(Into::into).collect()),
        })
    }
}

/// Coupon Update Handler
#[endpoint(
    tags("coupons"),
    summary = "Update Coupon",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Coupon updated"),
        (status_code = StatusCode::NOT_FOUND, description = "Coupon not found"),
        (status_code = StatusCode::CONFLICT, description = "Coupon code already exists"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "coupons.update",
    skip(coupon, json, depot),
    fields(coupon_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    coupon: PathParam<Uuid>,
    json: JsonBody<UpdateCouponRequest>,
    depot: &mut Depot,
) -> Result<Json<CouponEnvelope>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let coupon = CouponUuid::from_uuid(coupon.into_inner());
    let update = CouponUpdate::try_from(json.into_inner())?;

    tracing::Span::current().record("coupon_uuid", tracing::field::display(coupon));

    let updated = state
        .app
        .coupons
        .update_coupon(coupon, update)
        .await
        .map_err(into_status_error)?;

    tracing::info!(coupon_uuid = %coupon, "updated coupon");

    Ok(Json(CouponEnvelope::new("Coupon updated successfully", updated)))
}
