//! App Context

use std::sync::Arc;

use thiserror::Error;

use crate::{
    auth::{AuthService, HttpIdentityProvider, IdentityAuthService, IdentityProviderConfig},
    database::{self, Db, PoolSettings},
    domain::coupons::{CouponsService, PgCouponsService},
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),
}

#[derive(Clone)]
pub struct AppContext {
    pub coupons: Arc<dyn CouponsService>,
    pub auth: Arc<dyn AuthService>,
}

impl AppContext {
    /// Build application context from a database URL, pool sizing and
    /// identity provider settings.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection fails.
    pub async fn from_database_url(
        url: &str,
        pool: PoolSettings,
        identity: IdentityProviderConfig,
    ) -> Result<Self, AppInitError> {
        let pool = database::connect(url, pool)
            .await
            .map_err(AppInitError::Database)?;

        let provider = Arc::new(HttpIdentityProvider::new(identity));

        Ok(Self {
            coupons: Arc::new(PgCouponsService::new(Db::new(pool))),
            auth: Arc::new(IdentityAuthService::new(provider)),
        })
    }
}
