//! Identity Provider Config

use clap::Args;
use coupons_app::auth::IdentityProviderConfig;

/// Identity provider settings.
#[derive(Debug, Args)]
pub struct IdentityConfig {
    /// Identity provider base URL
    #[arg(long = "identity-provider-url", env = "IDENTITY_PROVIDER_URL")]
    pub url: String,

    /// Identity provider API key, sent with every request
    #[arg(
        long = "identity-provider-api-key",
        env = "IDENTITY_PROVIDER_API_KEY",
        hide_env_values = true
    )]
    pub api_key: String,
}

impl From<IdentityConfig> for IdentityProviderConfig {
    fn from(config: IdentityConfig) -> Self {
        Self {
            url: config.url,
            api_key: config.api_key,
        }
    }
}
