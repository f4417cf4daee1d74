//! Validate Coupon Handler

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use coupons::prelude::{CartContext, Discount, Evaluation, RejectionReason, evaluate};
use coupons_app::domain::coupons::{CouponsServiceError, records::CouponRecord};

use crate::{
    coupons::{
        errors::into_status_error,
        requests::{ProductId, to_decimal, to_number},
    },
    extensions::*,
    observability::observe_evaluation,
    state::State,
};

/// Validate Coupon Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ValidateCouponRequest {
    /// Cart subtotal before any discount
    pub cart_total: Option<f64>,

    /// Products in the cart
    #[serde(default)]
    pub product_ids: Vec<ProductId>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct DiscountResponse {
    #[serde(rename = "type")]
    pub kind: String,

    /// Raw coupon value
    pub value: f64,

    /// Amount taken off the cart, rounded to the currency's minor unit
    pub amount: f64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CouponSummary {
    pub id: Uuid,
    pub code: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub value: f64,
    pub min_purchase: Option<f64>,
    pub max_discount: Option<f64>,
}

impl From<&CouponRecord> for CouponSummary {
    fn from(coupon: &CouponRecord) -> Self {
        CouponSummary {
            id: coupon.uuid.into_uuid(),
            code: coupon.code.clone(),
            kind: coupon.kind.to_string(),
            value: to_number(coupon.value),
            min_purchase: coupon.min_purchase.map(to_number),
            max_discount: coupon.max_discount.map(to_number),
        }
    }
}

/// Validation Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ValidationResponse {
    pub valid: bool,
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<DiscountResponse>,

    /// Subtotal the cart must reach, when that was the reason for rejection
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_amount: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon: Option<CouponSummary>,
}

impl ValidationResponse {
    fn rejected(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: message.into(),
            discount: None,
            minimum_amount: None,
            coupon: None,
        }
    }
}

fn rejection(reason: RejectionReason) -> (StatusCode, ValidationResponse) {
    match reason {
        RejectionReason::Inactive => (
            StatusCode::NOT_FOUND,
            ValidationResponse::rejected("Coupon not found or inactive"),
        ),
        RejectionReason::OutsideWindow => (
            StatusCode::BAD_REQUEST,
            ValidationResponse::rejected("Coupon is expired or not yet active"),
        ),
        RejectionReason::UsageLimitReached => (
            StatusCode::BAD_REQUEST,
            ValidationResponse::rejected("Coupon usage limit has been reached"),
        ),
        RejectionReason::MinimumNotMet { minimum } => (
            StatusCode::BAD_REQUEST,
            ValidationResponse {
                minimum_amount: Some(to_number(minimum)),
                ..ValidationResponse::rejected(format!(
                    "Minimum purchase amount of {} not met",
                    minimum.normalize()
                ))
            },
        ),
        RejectionReason::NotApplicable => (
            StatusCode::BAD_REQUEST,
            ValidationResponse::rejected("Coupon does not apply to the products in cart"),
        ),
    }
}

fn accepted(coupon: &CouponRecord, discount: &Discount, state: &State) -> ValidationResponse {
    ValidationResponse {
        valid: true,
        message: "Coupon is valid".to_string(),
        discount: Some(DiscountResponse {
            kind: discount.kind.to_string(),
            value: to_number(discount.value),
            amount: to_number(discount.rounded_for(state.currency)),
        }),
        minimum_amount: None,
        coupon: Some(coupon.into()),
    }
}

/// Validate Coupon Handler
///
/// Checks a coupon against a cart and returns the discount it grants.
/// Nothing is recorded; use the redeem endpoint once the order is placed.
#[endpoint(
    tags("coupons"),
    summary = "Validate Coupon",
    responses(
        (status_code = StatusCode::OK, description = "Coupon is valid"),
        (status_code = StatusCode::BAD_REQUEST, description = "Coupon cannot be used with this cart"),
        (status_code = StatusCode::NOT_FOUND, description = "Coupon not found or inactive"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "coupons.validate",
    skip(code, json, depot, res),
    fields(coupon_code = %code.as_str(), outcome = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    code: PathParam<String>,
    json: JsonBody<ValidateCouponRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<ValidationResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let request = json.into_inner();

    let cart_total = request
        .cart_total
        .ok_or_else(|| StatusError::bad_request().brief("cartTotal is required"))?;

    let cart = CartContext::new(
        to_decimal(cart_total, "cartTotal")?,
        request.product_ids.into_iter().map(String::from),
    )
    .or_400("cartTotal must not be negative")?;

    let span = tracing::Span::current();

    let coupon = match state.app.coupons.get_active_coupon_by_code(code.as_str()).await {
        Ok(coupon) => coupon,
        Err(CouponsServiceError::NotFound) => {
            span.record("outcome", "not_found");
            observe_evaluation("not_found");
            res.status_code(StatusCode::NOT_FOUND);

            return Ok(Json(ValidationResponse::rejected(
                "Coupon not found or inactive",
            )));
        }
        Err(error) => return Err(into_status_error(error)),
    };

    let snapshot = coupon.to_coupon().or_500("stored coupon has invalid terms")?;

    let evaluation = evaluate(&snapshot, &cart, Timestamp::now()).map_err(|error| {
        span.record("outcome", "invalid_input");
        observe_evaluation("invalid_input");

        tracing::error!("failed to evaluate coupon: {error}");

        StatusError::internal_server_error()
    })?;

    match evaluation {
        Evaluation::Valid(discount) => {
            span.record("outcome", "valid");
            observe_evaluation("valid");

            Ok(Json(accepted(&coupon, &discount, state)))
        }
        Evaluation::Rejected(reason) => {
            span.record("outcome", reason.as_str());
            observe_evaluation(reason.as_str());

            let (status, body) = rejection(reason);

            res.status_code(status);

            Ok(Json(body))
        }
    }
}

#[cfg(test)]
mod tests {
    use coupons::coupons::AppliesTo;
    use coupons_app::domain::coupons::{MockCouponsService, records::CouponUuid};
    use jiff::ToSpan;
    use rust_decimal_macros::dec;
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::{Value, json};
    use testresult::TestResult;

    use crate::test_helpers::{make_coupon, public_coupons_service};

    use super::*;

    fn make_service(coupons: MockCouponsService) -> Service {
        public_coupons_service(
            coupons,
            Router::with_path("coupons/validate/{code}").post(handler),
        )
    }

    fn returning(record: CouponRecord) -> MockCouponsService {
        let mut coupons = MockCouponsService::new();

        coupons
            .expect_get_active_coupon_by_code()
            .once()
            .withf(|code| code == "SUMMER25")
            .return_once(move |_| Ok(record));

        coupons
    }

    async fn validate(coupons: MockCouponsService, body: Value) -> (Option<StatusCode>, Value) {
        let mut res = TestClient::post("http://example.com/coupons/validate/SUMMER25")
            .json(&body)
            .send(&make_service(coupons))
            .await;

        let body = res.take_json().await.unwrap_or(Value::Null);

        (res.status_code, body)
    }

    #[tokio::test]
    async fn test_valid_percentage_coupon_is_capped() -> TestResult {
        let coupons = returning(make_coupon(CouponUuid::new(), "SUMMER25"));

        let (status, body) = validate(coupons, json!({ "cartTotal": 300 })).await;

        assert_eq!(status, Some(StatusCode::OK));
        assert_eq!(body["valid"], true);
        assert_eq!(body["message"], "Coupon is valid");
        assert_eq!(body["discount"]["type"], "percentage");
        assert_eq!(body["discount"]["amount"], 50.0);
        assert_eq!(body["coupon"]["code"], "SUMMER25");
        assert_eq!(body["coupon"]["maxDiscount"], 50.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_discount_amount_is_rounded_to_cents() -> TestResult {
        let mut record = make_coupon(CouponUuid::new(), "SUMMER25");

        record.value = dec!(12.5);
        record.min_purchase = None;
        record.max_discount = None;

        let (status, body) = validate(returning(record), json!({ "cartTotal": 10.1 })).await;

        assert_eq!(status, Some(StatusCode::OK));
        assert_eq!(body["discount"]["amount"], 1.26);

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_code_returns_404() -> TestResult {
        let mut coupons = MockCouponsService::new();

        coupons
            .expect_get_active_coupon_by_code()
            .once()
            .return_once(|_| Err(CouponsServiceError::NotFound));

        let (status, body) = validate(coupons, json!({ "cartTotal": 300 })).await;

        assert_eq!(status, Some(StatusCode::NOT_FOUND));
        assert_eq!(body["valid"], false);
        assert_eq!(body["message"], "Coupon not found or inactive");

        Ok(())
    }

    #[tokio::test]
    async fn test_expired_coupon_returns_400() -> TestResult {
        let mut record = make_coupon(CouponUuid::new(), "SUMMER25");

        record.valid_from = Timestamp::now() - 48.hours();
        record.valid_until = Timestamp::now() - 24.hours();

        let (status, body) = validate(returning(record), json!({ "cartTotal": 300 })).await;

        assert_eq!(status, Some(StatusCode::BAD_REQUEST));
        assert_eq!(body["message"], "Coupon is expired or not yet active");

        Ok(())
    }

    #[tokio::test]
    async fn test_exhausted_coupon_returns_400() -> TestResult {
        let mut record = make_coupon(CouponUuid::new(), "SUMMER25");

        record.usage_count = 100;

        let (status, body) = validate(returning(record), json!({ "cartTotal": 300 })).await;

        assert_eq!(status, Some(StatusCode::BAD_REQUEST));
        assert_eq!(body["message"], "Coupon usage limit has been reached");

        Ok(())
    }

    #[tokio::test]
    async fn test_minimum_not_met_reports_the_minimum() -> TestResult {
        let coupons = returning(make_coupon(CouponUuid::new(), "SUMMER25"));

        let (status, body) = validate(coupons, json!({ "cartTotal": 99.99 })).await;

        assert_eq!(status, Some(StatusCode::BAD_REQUEST));
        assert_eq!(body["valid"], false);
        assert_eq!(body["message"], "Minimum purchase amount of 100 not met");
        assert_eq!(body["minimumAmount"], 100.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_coupon_for_other_products_returns_400() -> TestResult {
        let mut record = make_coupon(CouponUuid::new(), "SUMMER25");

        record.applies_to = AppliesTo::Products;
        record.applicable_ids = vec!["sku-1".to_string()];

        let (status, body) = validate(
            returning(record),
            json!({ "cartTotal": 300, "productIds": ["sku-2", 7] }),
        )
        .await;

        assert_eq!(status, Some(StatusCode::BAD_REQUEST));
        assert_eq!(
            body["message"],
            "Coupon does not apply to the products in cart"
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_numeric_product_ids_match_string_ids() -> TestResult {
        let mut record = make_coupon(CouponUuid::new(), "SUMMER25");

        record.applies_to = AppliesTo::Products;
        record.applicable_ids = vec!["7".to_string()];

        let (status, body) = validate(
            returning(record),
            json!({ "cartTotal": 300, "productIds": [7] }),
        )
        .await;

        assert_eq!(status, Some(StatusCode::OK));
        assert_eq!(body["valid"], true);

        Ok(())
    }

    #[tokio::test]
    async fn test_negative_cart_total_returns_400() -> TestResult {
        let mut coupons = MockCouponsService::new();

        coupons.expect_get_active_coupon_by_code().never();

        let (status, _body) = validate(coupons, json!({ "cartTotal": -5 })).await;

        assert_eq!(status, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_missing_cart_total_returns_400() -> TestResult {
        let mut coupons = MockCouponsService::new();

        coupons.expect_get_active_coupon_by_code().never();

        let (status, _body) = validate(coupons, json!({ "productIds": [] })).await;

        assert_eq!(status, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
