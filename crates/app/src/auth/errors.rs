//! Auth service errors.

use thiserror::Error;

use crate::auth::IdentityProviderError;

#[derive(Debug, Error)]
pub enum AuthServiceError {
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("invalid or expired token")]
    Unauthorized,

    #[error("user email is missing")]
    MissingEmail,

    #[error("registration rejected: {0}")]
    RegistrationRejected(String),

    #[error("identity provider error")]
    Provider(#[from] IdentityProviderError),
}
