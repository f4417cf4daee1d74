//! Create Coupon Handler

use std::{str::FromStr, sync::Arc};

use salvo::{
    http::header::LOCATION,
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use coupons::coupons::{AppliesTo, CouponKind};
use coupons_app::domain::coupons::{data::NewCoupon, records::CouponUuid};

use crate::{
    coupons::{
        errors::into_status_error,
        get::CouponEnvelope,
        requests::{ProductId, invalid, parse_timestamp, present, to_decimal},
    },
    extensions::*,
    state::State,
};

/// Create Coupon Request
///
/// `code`, `type`, `value`, `validFrom`, `validUntil` and `appliesTo` are
/// required.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateCouponRequest {
    pub code: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub value: Option<f64>,
    pub min_purchase: Option<f64>,
    pub max_discount: Option<f64>,
    pub valid_from: Option<String>,
    pub valid_until: Option<String>,
    pub usage_limit: Option<u64>,
    pub is_active: Option<bool>,
    pub applies_to: Option<String>,
    pub applicable_ids: Option<Vec<ProductId>>,
}

impl TryFrom<CreateCouponRequest> for NewCoupon {
    type Error = StatusError;

    fn try_from(request: CreateCouponRequest) -> Result<Self, Self::Error> {
        let (
            Some(code),
            Some(kind),
            Some(value),
            Some(valid_from),
            Some(valid_until),
            Some(applies_to),
        ) = (
            present(request.code),
            present(request.kind),
            request.value,
            present(request.valid_from),
            present(request.valid_until),
            present(request.applies_to),
        )
        else {
            return Err(StatusError::bad_request().brief("Missing required fields"));
        };

        Ok(NewCoupon {
            uuid: CouponUuid::new(),
            code,
            kind: CouponKind::from_str(&kind).map_err(invalid)?,
            value: to_decimal(value, "value")?,
            min_purchase: request
                .min_purchase
                .map(|amount| to_decimal(amount, "minPurchase"))
                .transpose()?,
            max_discount: request
                .max_discount
                .map(|amount| to_decimal(amount, "maxDiscount"))
                .transpose()?,
            valid_from: parse_timestamp(&valid_from, "validFrom")?,
            valid_until: parse_timestamp(&valid_until, "validUntil")?,
            usage_limit: request.usage_limit,
            is_active: request.is_active.unwrap_or(true),
            applies_to: AppliesTo::from_str(&applies_to).map_err(invalid)?,
            applicable_ids: request
                .applicable_ids
                .unwrap_or_default()
                .into_iter()
                .map(Into::into)
                .collect(),
        })
    }
}

/// Create Coupon Handler
#[endpoint(
    tags("coupons"),
    summary = "Create Coupon",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Coupon created"),
        (status_code = StatusCode::CONFLICT, description = "Coupon code already exists"),
        (status_code = StatusCode::BAD_REQUEST, description = "Missing or invalid fields"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "coupons.create",
    skip(json, depot, res),
    fields(coupon_code = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    json: JsonBody<CreateCouponRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<CouponEnvelope>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let new_coupon = NewCoupon::try_from(json.into_inner())?;

    tracing::Span::current().record("coupon_code", tracing::field::display(&new_coupon.code));

    let coupon = state
        .app
        .coupons
        .create_coupon(new_coupon)
        .await
        .map_err(into_status_error)?;

    res.add_header(LOCATION, format!("/coupons/{}", coupon.uuid), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    tracing::info!(coupon_uuid = %coupon.uuid, "created coupon");

    Ok(Json(CouponEnvelope::new("Coupon created successfully", coupon)))
}
