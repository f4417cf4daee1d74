//! Delete Coupon Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use coupons_app::domain::coupons::records::CouponUuid;

use crate::{
    coupons::errors::into_status_error, extensions::*, responses::MessageResponse, state::State,
};

/// Delete Coupon Handler
#[endpoint(
    tags("coupons"),
    summary = "Delete Coupon",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Coupon deleted"),
        (status_code = StatusCode::NOT_FOUND, description = "Coupon not found"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    coupon: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<MessageResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let coupon = CouponUuid::from_uuid(coupon.into_inner());

    state
        .app
        .coupons
        .delete_coupon(coupon)
        .await
        .map_err(into_status_error)?;

    tracing::info!(coupon_uuid = %coupon, "deleted coupon");

    Ok(Json(MessageResponse::new("Coupon deleted successfully")))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use coupons_app::domain::coupons::{CouponsServiceError, MockCouponsService};

    use crate::test_helpers::coupons_service;

    use super::*;

    fn make_service(coupons: MockCouponsService) -> Service {
        coupons_service(coupons, Router::with_path("coupons/{coupon}").delete(handler))
    }

    #[tokio::test]
    async fn test_delete_coupon_success() -> TestResult {
        let uuid = CouponUuid::new();

        let mut coupons = MockCouponsService::new();

        coupons
            .expect_delete_coupon()
            .once()
            .withf(move |coupon| *coupon == uuid)
            .return_once(|_| Ok(()));

        let mut res = TestClient::delete(format!("http://example.com/coupons/{uuid}"))
            .send(&make_service(coupons))
            .await;

        let body: MessageResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.message, "Coupon deleted successfully");

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_coupon_not_found_returns_404() -> TestResult {
        let mut coupons = MockCouponsService::new();

        coupons
            .expect_delete_coupon()
            .once()
            .return_once(|_| Err(CouponsServiceError::NotFound));

        let res = TestClient::delete(format!("http://example.com/coupons/{}", CouponUuid::new()))
            .send(&make_service(coupons))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }
}
