//! Auth Errors

use coupons_app::auth::AuthServiceError;
use salvo::http::StatusError;
use tracing::error;

pub(crate) fn into_status_error(error: AuthServiceError) -> StatusError {
    match error {
        AuthServiceError::InvalidCredentials => {
            StatusError::unauthorized().brief("Invalid email or password")
        }
        AuthServiceError::Unauthorized => {
            StatusError::unauthorized().brief("Invalid or expired token")
        }
        AuthServiceError::RegistrationRejected(message) => {
            StatusError::bad_request().brief(message)
        }
        AuthServiceError::MissingEmail => {
            error!("identity provider returned a user without an email");

            StatusError::internal_server_error()
        }
        AuthServiceError::Provider(source) => {
            error!("identity provider request failed: {source}");

            StatusError::internal_server_error()
        }
    }
}
