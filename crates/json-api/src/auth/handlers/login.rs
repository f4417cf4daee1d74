//! Login Handler

use std::{fmt, sync::Arc};

use coupons_app::auth::{Credentials, Password, Session};
use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use crate::{
    auth::{
        errors::into_status_error,
        handlers::{UserResponse, present},
    },
    extensions::*,
    state::State,
};

/// Login Request
#[derive(Serialize, Deserialize, ToSchema)]
pub(crate) struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl LoginRequest {
    fn into_credentials(self) -> Option<Credentials> {
        Some(Credentials {
            email: present(self.email)?,
            password: Password::new(self.password.filter(|password| !password.is_empty())?),
        })
    }
}

/// Session issued by the identity provider
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SessionResponse {
    pub access_token: String,
    pub token_type: String,

    /// Seconds until the access token expires
    pub expires_in: u64,

    pub user: UserResponse,
}

impl From<Session> for SessionResponse {
    fn from(session: Session) -> Self {
        SessionResponse {
            access_token: session.access_token,
            token_type: session.token_type,
            expires_in: session.expires_in,
            user: session.user.into(),
        }
    }
}

/// Logged In Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct LoggedInResponse {
    pub message: String,
    pub session: SessionResponse,
}

/// Login Handler
#[endpoint(
    tags("auth"),
    summary = "Log In",
    responses(
        (status_code = StatusCode::OK, description = "Logged in"),
        (status_code = StatusCode::BAD_REQUEST, description = "Missing email or password"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Invalid email or password"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<LoginRequest>,
    depot: &mut Depot,
) -> Result<Json<LoggedInResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let credentials = json
        .into_inner()
        .into_credentials()
        .ok_or_else(|| StatusError::bad_request().brief("Email and password are required"))?;

    let session = state
        .app
        .auth
        .login(credentials)
        .await
        .map_err(into_status_error)?;

    Ok(Json(LoggedInResponse {
        message: "Login successful".to_string(),
        session: session.into(),
    }))
}
