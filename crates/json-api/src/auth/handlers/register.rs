//! Register Handler

use std::{fmt, sync::Arc};

use coupons_app::auth::{NewUser, Password};
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

/// Register Request
#[derive(Serialize, Deserialize, ToSchema)]
pub(crate) struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("email", &self.email)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl RegisterRequest {
    fn into_new_user(self) -> Option<NewUser> {
        Some(NewUser {
            email: present(self.email)?,
            password: Password::new(self.password.filter(|password| !password.is_empty())?),
            name: present(self.name)?,
        })
    }
}

/// Registered Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct RegisteredResponse {
    pub message: String,
    pub user: UserResponse,
}

/// Register Handler
#[endpoint(
    tags("auth"),
    summary = "Register User",
    responses(
        (status_code = StatusCode::CREATED, description = "User created"),
        (status_code = StatusCode::BAD_REQUEST, description = "Missing fields or already registered"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<RegisterRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<RegisteredResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let new_user = json
        .into_inner()
        .into_new_user()
        .ok_or_else(|| StatusError::bad_request().brief("All fields are required"))?;

    let user = state
        .app
        .auth
        .register(new_user)
        .await
        .map_err(into_status_error)?;

    res.status_code(StatusCode::CREATED);

    Ok(Json(RegisteredResponse {
        message: "User created successfully".to_string(),
        user: user.into(),
    }))
}
