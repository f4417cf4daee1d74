//! Identity provider client.
//!
//! Speaks the GoTrue-style REST API: password sign-up and sign-in, sign-out
//! and access token introspection. Every request carries the project API key
//! in the `apikey` header.

use async_trait::async_trait;
use mockall::automock;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::auth::Password;

/// Configuration for connecting to the identity provider.
#[derive(Debug, Clone)]
pub struct IdentityProviderConfig {
    /// Provider base address, e.g. `"https://project.example.co"`.
    pub url: String,

    /// Project API key sent with every request.
    pub api_key: String,
}

/// A user as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IdentityUser {
    pub id: Uuid,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub user_metadata: IdentityUserMetadata,
}

/// Free-form profile data stored alongside a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct IdentityUserMetadata {
    #[serde(default)]
    pub name: Option<String>,
}

/// Session issued after a successful password sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IdentitySession {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub user: IdentityUser,
}

/// Sign-up answers with a session when no email confirmation is required,
/// otherwise with the bare user.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session { user: IdentityUser },
    User(IdentityUser),
}

/// Errors that can occur when communicating with the identity provider.
#[derive(Debug, Error)]
pub enum IdentityProviderError {
    /// An HTTP transport or serialization error occurred.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider refused the request.
    #[error("identity provider rejected the request with status {status}: {message}")]
    Rejected { status: u16, message: String },
}

#[automock]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Register a user with an email and password.
    async fn sign_up(
        &self,
        email: &str,
        password: &Password,
        name: &str,
    ) -> Result<IdentityUser, IdentityProviderError>;

    /// Exchange an email and password for a session.
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &Password,
    ) -> Result<IdentitySession, IdentityProviderError>;

    /// Revoke the session behind an access token.
    async fn sign_out(&self, access_token: &str) -> Result<(), IdentityProviderError>;

    /// Look up the user owning an access token; `None` when the token is not
    /// accepted.
    async fn get_user(&self, access_token: &str)
    -> Result<Option<IdentityUser>, IdentityProviderError>;
}

/// HTTP client for the identity provider.
#[derive(Debug, Clone)]
pub struct HttpIdentityProvider {
    config: IdentityProviderConfig,
    http: Client,
}

impl HttpIdentityProvider {
    /// Create a new client from the given configuration.
    #[must_use]
    pub fn new(config: IdentityProviderConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1/{path}", self.config.url.trim_end_matches('/'))
    }

    fn request(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header("apikey", &self.config.api_key)
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn sign_up(
        &self,
        email: &str,
        password: &Password,
        name: &str,
    ) -> Result<IdentityUser, IdentityProviderError> {
        let body = json!({
            "email": email,
            "password": password.expose(),
            "data": { "name": name },
        });

        let response = self
            .request(self.http.post(self.endpoint("signup")))
            .json(&body)
            .send()
            .await?;

        let parsed: SignUpResponse = ensure_success(response).await?.json().await?;

        Ok(match parsed {
            SignUpResponse::Session { user } | SignUpResponse::User(user) => user,
        })
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &Password,
    ) -> Result<IdentitySession, IdentityProviderError> {
        let body = json!({
            "email": email,
            "password": password.expose(),
        });

        let response = self
            .request(self.http.post(self.endpoint("token")))
            .query(&[("grant_type", "password")])
            .json(&body)
            .send()
            .await?;

        Ok(ensure_success(response).await?.json().await?)
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), IdentityProviderError> {
        let response = self
            .request(self.http.post(self.endpoint("logout")))
            .bearer_auth(access_token)
            .send()
            .await?;

        ensure_success(response).await?;

        Ok(())
    }

    async fn get_user(
        &self,
        access_token: &str,
    ) -> Result<Option<IdentityUser>, IdentityProviderError> {
        let response = self
            .request(self.http.get(self.endpoint("user")))
            .bearer_auth(access_token)
            .send()
            .await?;

        if matches!(
            response.status(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            return Ok(None);
        }

        Ok(Some(ensure_success(response).await?.json().await?))
    }
}

async fn ensure_success(response: Response) -> Result<Response, IdentityProviderError> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();

    Err(IdentityProviderError::Rejected {
        status: status.as_u16(),
        message: rejection_message(&text),
    })
}

/// Pull the human readable message out of an error body.
fn rejection_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        msg: Option<String>,
        message: Option<String>,
        error_description: Option<String>,
    }

    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|error| error.msg.or(error.message).or(error.error_description))
        .unwrap_or_else(|| body.to_string())
}
