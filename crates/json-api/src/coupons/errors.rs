//! Coupon Errors

use salvo::http::StatusError;
use tracing::error;

use coupons_app::domain::coupons::CouponsServiceError;

pub(crate) fn into_status_error(error: CouponsServiceError) -> StatusError {
    match error {
        CouponsServiceError::AlreadyExists => {
            StatusError::conflict().brief("Coupon code already exists")
        }
        CouponsServiceError::NotFound => StatusError::not_found().brief("Coupon not found"),
        CouponsServiceError::UsageLimitReached => {
            StatusError::conflict().brief("Coupon usage limit has been reached")
        }
        CouponsServiceError::OutsideWindow => {
            StatusError::bad_request().brief("Coupon is expired or not yet active")
        }
        CouponsServiceError::MissingRequiredData => {
            StatusError::bad_request().brief("Missing required fields")
        }
        CouponsServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid coupon payload")
        }
        CouponsServiceError::InvalidTerms(source) => {
            StatusError::bad_request().brief(source.to_string())
        }
        CouponsServiceError::Sql(source) => {
            error!("coupon storage error: {source}");

            StatusError::internal_server_error()
        }
    }
}
