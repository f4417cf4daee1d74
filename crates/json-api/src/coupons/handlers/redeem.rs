//! Redeem Coupon Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};

use coupons_app::domain::coupons::CouponsServiceError;

use crate::{
    coupons::{errors::into_status_error, get::CouponEnvelope},
    extensions::*,
    observability::observe_redemption,
    state::State,
};

/// Redeem Coupon Handler
///
/// Records one use of a coupon. Fails outside the validity window and once
/// the usage limit is used up.
#[endpoint(
    tags("coupons"),
    summary = "Redeem Coupon",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Coupon redeemed"),
        (status_code = StatusCode::BAD_REQUEST, description = "Coupon is expired or not yet active"),
        (status_code = StatusCode::NOT_FOUND, description = "Coupon not found or inactive"),
        (status_code = StatusCode::CONFLICT, description = "Coupon usage limit has been reached"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(name = "coupons.redeem", skip(code, depot), fields(coupon_code = %code.as_str()), err)]
pub(crate) async fn handler(
    code: PathParam<String>,
    depot: &mut Depot,
) -> Result<Json<CouponEnvelope>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.current_user_or_401()?;

    let coupon = state
        .app
        .coupons
        .redeem_coupon(code.as_str())
        .await
        .map_err(|error| {
            match &error {
                CouponsServiceError::NotFound => observe_redemption("not_found"),
                CouponsServiceError::UsageLimitReached => observe_redemption("usage_limit_reached"),
                CouponsServiceError::OutsideWindow => observe_redemption("outside_window"),
                _ => {}
            }

            into_status_error(error)
        })?;

    observe_redemption("redeemed");

    tracing::info!(
        coupon_uuid = %coupon.uuid,
        usage_count = coupon.usage_count,
        user_id = %user.id,
        "redeemed coupon"
    );

    Ok(Json(CouponEnvelope::new("Coupon redeemed successfully", coupon)))
}
