//! Shared response bodies

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};

/// Response carrying only a message
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
