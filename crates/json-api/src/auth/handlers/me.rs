//! Current User Handler

use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};

use crate::{auth::handlers::UserResponse, extensions::*};

/// Current User Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CurrentUserResponse {
    pub user: UserResponse,
}

/// Current User Handler
///
/// Returns the user behind the bearer token.
#[endpoint(
    tags("auth"),
    summary = "Current User",
    security(("bearer_auth" = []))
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<CurrentUserResponse>, StatusError> {
    let user = depot.current_user_or_401()?.clone();

    Ok(Json(CurrentUserResponse { user: user.into() }))
}
