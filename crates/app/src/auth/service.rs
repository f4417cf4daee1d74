//! Auth service.

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use tracing::{debug, info};

use crate::auth::{
    AuthServiceError, AuthenticatedUser, Credentials, NewUser, Session,
    provider::{IdentityProvider, IdentityProviderError},
};

#[derive(Clone)]
pub struct IdentityAuthService {
    provider: Arc<dyn IdentityProvider>,
}

impl IdentityAuthService {
    #[must_use]
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self { provider }
    }
}

impl std::fmt::Debug for IdentityAuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityAuthService").finish_non_exhaustive()
    }
}

#[async_trait]
impl AuthService for IdentityAuthService {
    #[tracing::instrument(name = "coupons.service.register", skip(self, user), err)]
    async fn register(&self, user: NewUser) -> Result<AuthenticatedUser, AuthServiceError> {
        let created = self
            .provider
            .sign_up(&user.email, &user.password, &user.name)
            .await
            .map_err(|error| match error {
                IdentityProviderError::Rejected { status, message } if status < 500 => {
                    AuthServiceError::RegistrationRejected(message)
                }
                other => AuthServiceError::Provider(other),
            })?;

        let user = AuthenticatedUser::try_from(created)?;

        info!(user_id = %user.id, "registered user");

        Ok(user)
    }

    #[tracing::instrument(name = "coupons.service.login", skip(self, credentials), err)]
    async fn login(&self, credentials: Credentials) -> Result<Session, AuthServiceError> {
        let session = self
            .provider
            .sign_in_with_password(&credentials.email, &credentials.password)
            .await
            .map_err(|error| match error {
                IdentityProviderError::Rejected { status, .. } if status < 500 => {
                    AuthServiceError::InvalidCredentials
                }
                other => AuthServiceError::Provider(other),
            })?;

        Ok(Session {
            access_token: session.access_token,
            token_type: session.token_type,
            expires_in: session.expires_in,
            user: AuthenticatedUser::try_from(session.user)?,
        })
    }

    #[tracing::instrument(name = "coupons.service.logout", skip_all, err)]
    async fn logout(&self, access_token: &str) -> Result<(), AuthServiceError> {
        self.provider.sign_out(access_token).await?;

        Ok(())
    }

    #[tracing::instrument(name = "coupons.service.authenticate_bearer", skip_all, err)]
    async fn authenticate_bearer(
        &self,
        bearer_token: &str,
    ) -> Result<AuthenticatedUser, AuthServiceError> {
        let Some(user) = self.provider.get_user(bearer_token).await? else {
            debug!("identity provider refused bearer token");

            return Err(AuthServiceError::Unauthorized);
        };

        AuthenticatedUser::try_from(user)
    }
}

#[automock]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a new user.
    async fn register(&self, user: NewUser) -> Result<AuthenticatedUser, AuthServiceError>;

    /// Sign in with an email and password.
    async fn login(&self, credentials: Credentials) -> Result<Session, AuthServiceError>;

    /// End the session behind an access token.
    async fn logout(&self, access_token: &str) -> Result<(), AuthServiceError>;

    /// Resolve the user behind a bearer token.
    async fn authenticate_bearer(
        &self,
        bearer_token: &str,
    ) -> Result<AuthenticatedUser, AuthServiceError>;
}
