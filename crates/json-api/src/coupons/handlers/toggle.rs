//! Toggle Coupon Handler

use std::sync::Arc;

use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use coupons_app::domain::coupons::records::CouponUuid;

use crate::{
    coupons::{errors::into_status_error, get::CouponEnvelope},
    extensions::*,
    state::State,
};

/// Toggle Coupon Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ToggleCouponRequest {
    /// Whether the coupon can be used
    pub is_active: Option<bool>,
}

/// Toggle Coupon Handler
///
/// Activates or deactivates a coupon.
#[endpoint(
    tags("coupons"),
    summary = "Toggle Coupon Status",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Coupon status changed"),
        (status_code = StatusCode::NOT_FOUND, description = "Coupon not found"),
        (status_code = StatusCode::BAD_REQUEST, description = "isActive field is required"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    coupon: PathParam<Uuid>,
    json: JsonBody<ToggleCouponRequest>,
    depot: &mut Depot,
) -> Result<Json<CouponEnvelope>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let coupon = CouponUuid::from_uuid(coupon.into_inner());

    let is_active = json
        .into_inner()
        .is_active
        .ok_or_else(|| StatusError::bad_request().brief("isActive field is required"))?;

    let updated = state
        .app
        .coupons
        .set_coupon_active(coupon, is_active)
        .await
        .map_err(into_status_error)?;

    tracing::info!(coupon_uuid = %coupon, is_active, "changed coupon status");

    let message = if is_active {
        "Coupon activated successfully"
    } else {
        "Coupon deactivated successfully"
    };

    Ok(Json(CouponEnvelope::new(message, updated)))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use coupons_app::domain::coupons::{CouponsServiceError, MockCouponsService};

    use crate::test_helpers::{coupons_service, make_coupon};

    use super::*;

    fn make_service(coupons: MockCouponsService) -> Service {
        coupons_service(
            coupons,
            Router::with_path("coupons/{coupon}/toggle").patch(handler),
        )
    }

    #[tokio::test]
    async fn test_toggle_deactivates_coupon() -> TestResult {
        let uuid = CouponUuid::new();

        let mut coupons = MockCouponsService::new();

        coupons
            .expect_set_coupon_active()
            .once()
            .withf(move |coupon, is_active| *coupon == uuid && !*is_active)
            .return_once(move |_, _| {
                let mut record = make_coupon(uuid, "SUMMER25");

                record.is_active = false;

                Ok(record)
            });

        let mut res = TestClient::patch(format!("http://example.com/coupons/{uuid}/toggle"))
            .json(&json!({ "isActive": false }))
            .send(&make_service(coupons))
            .await;

        let body: CouponEnvelope = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.message, "Coupon deactivated successfully");
        assert!(!body.data.is_active, "expected coupon to be inactive");

        Ok(())
    }

    #[tokio::test]
    async fn test_toggle_without_is_active_returns_400() -> TestResult {
        let mut coupons = MockCouponsService::new();

        coupons.expect_set_coupon_active().never();

        let res = TestClient::patch(format!(
            "http://example.com/coupons/{}/toggle",
            CouponUuid::new()
        ))
        .json(&json!({}))
        .send(&make_service(coupons))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_toggle_unknown_coupon_returns_404() -> TestResult {
        let mut coupons = MockCouponsService::new();

        coupons
            .expect_set_coupon_active()
            .once()
            .return_once(|_, _| Err(CouponsServiceError::NotFound));

        let res = TestClient::patch(format!(
            "http://example.com/coupons/{}/toggle",
            CouponUuid::new()
        ))
        .json(&json!({ "isActive": true }))
        .send(&make_service(coupons))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }
}
