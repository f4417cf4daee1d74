//! Logout Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    auth::{errors::into_status_error, middleware::extract_bearer_token},
    extensions::*,
    responses::MessageResponse,
    state::State,
};

/// Logout Handler
///
/// Ends the session behind the bearer token.
#[endpoint(
    tags("auth"),
    summary = "Log Out",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Logged out"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Unauthorized"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
) -> Result<Json<MessageResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.current_user_or_401()?;

    let token = extract_bearer_token(req).ok_or_else(StatusError::unauthorized)?;

    state
        .app
        .auth
        .logout(token)
        .await
        .map_err(into_status_error)?;

    tracing::info!(user_id = %user.id, "logged out");

    Ok(Json(MessageResponse::new("Logout successful")))
}
