//! Auth data models.

use std::fmt;

use serde::Serialize;
use uuid::Uuid;
use zeroize::Zeroize;

use crate::auth::{AuthServiceError, provider::IdentityUser};

/// A plaintext password, held only as long as a request needs it.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    #[must_use]
    pub fn new(password: impl Into<String>) -> Self {
        Self(password.into())
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(**redacted**)")
    }
}

impl Drop for Password {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// Email and password sign-in.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: Password,
}

/// Registration details.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password: Password,
    pub name: String,
}

/// The user behind an accepted access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
}

impl TryFrom<IdentityUser> for AuthenticatedUser {
    type Error = AuthServiceError;

    fn try_from(user: IdentityUser) -> Result<Self, Self::Error> {
        let email = user
            .email
            .filter(|email| !email.is_empty())
            .ok_or(AuthServiceError::MissingEmail)?;

        Ok(Self {
            id: user.id,
            email,
            name: user.user_metadata.name,
        })
    }
}

/// Session handed back after login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub user: AuthenticatedUser,
}
