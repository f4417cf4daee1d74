//! Authentication against an external identity provider.

mod errors;
mod models;
pub mod provider;
mod service;

pub use errors::*;
pub use models::*;
pub use provider::{
    HttpIdentityProvider, IdentityProvider, IdentityProviderConfig, IdentityProviderError,
    MockIdentityProvider,
};
pub use service::*;
