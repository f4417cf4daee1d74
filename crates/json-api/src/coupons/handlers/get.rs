//! Get Coupon Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::PathParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use coupons_app::domain::coupons::records::{CouponRecord, CouponUuid};

use crate::{
    coupons::{errors::into_status_error, requests::to_number},
    extensions::*,
    state::State,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CouponResponse {
    /// The unique identifier of the coupon
    pub id: Uuid,

    /// The code shoppers enter
    pub code: String,

    /// `percentage`, `fixed`, `shipping` or `buyXgetY`
    #[serde(rename = "type")]
    pub kind: String,

    /// Percent, amount or free item count, depending on the type
    pub value: f64,

    pub min_purchase: Option<f64>,
    pub max_discount: Option<f64>,

    /// Start of the validity window
    pub valid_from: String,

    /// End of the validity window
    pub valid_until: String,

    pub usage_limit: Option<u64>,
    pub usage_count: u64,
    pub is_active: bool,

    /// `all`, `categories` or `products`
    pub applies_to: String,

    pub applicable_ids: Vec<String>,

    /// The date and time the coupon was created
    pub created_at: String,

    /// The date and time the coupon was last updated
    pub updated_at: String,
}

impl From<CouponRecord> for CouponResponse {
    fn from(coupon: CouponRecord) -> Self {
        CouponResponse {
            id: coupon.uuid.into_uuid(),
            code: coupon.code,
            kind: coupon.kind.to_string(),
            value: to_number(coupon.value),
            min_purchase: coupon.min_purchase.map(to_number),
            max_discount: coupon.max_discount.map(to_number),
            valid_from: coupon.valid_from.to_string(),
            valid_until: coupon.valid_until.to_string(),
            usage_limit: coupon.usage_limit,
            usage_count: coupon.usage_count,
            is_active: coupon.is_active,
            applies_to: coupon.applies_to.to_string(),
            applicable_ids: coupon.applicable_ids,
            created_at: coupon.created_at.to_string(),
            updated_at: coupon.updated_at.to_string(),
        }
    }
}

/// A message and the coupon it concerns
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CouponEnvelope {
    pub message: String,
    pub data: CouponResponse,
}

impl CouponEnvelope {
    pub(crate) fn new(message: impl Into<String>, coupon: CouponRecord) -> Self {
        Self {
            message: message.into(),
            data: coupon.into(),
        }
    }
}

/// Get Coupon Handler
///
/// Returns a coupon.
#[endpoint(
    tags("coupons"),
    summary = "Get Coupon",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Coupon found"),
        (status_code = StatusCode::NOT_FOUND, description = "Coupon not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    coupon: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<CouponEnvelope>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let coupon = state
        .app
        .coupons
        .get_coupon(CouponUuid::from_uuid(coupon.into_inner()))
        .await
        .map_err(into_status_error)?;

    Ok(Json(CouponEnvelope::new(
        "Coupon retrieved successfully",
        coupon,
    )))
}
