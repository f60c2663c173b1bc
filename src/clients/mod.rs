//! Per-channel provider clients.
//!
//! Each channel defines one client trait plus the typed gateway
//! configurations of its providers. Client configs are serde-tagged by
//! `client`, so an unknown provider name is rejected when the configuration
//! is deserialized, before any dispatcher exists.

pub mod email;
pub mod push;
pub mod sms;
pub mod telegram;
pub mod whatsapp;

use serde::{Deserialize, Serialize};

/// What a provider answered to a send attempt.
///
/// Failures are `Err(AppError::Delivery)`, so this only describes accepted
/// requests.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderResponse {
    /// HTTP status code, when the provider is HTTP-based
    pub status_code: Option<u16>,
    /// Raw response body or transport-level response line
    pub body: Option<String>,
    /// Provider-assigned message identifier, when one is returned
    pub message_id: Option<String>,
}

impl ProviderResponse {
    pub fn accepted() -> Self {
        Self::default()
    }

    pub fn with_status(status_code: u16, body: Option<String>) -> Self {
        Self {
            status_code: Some(status_code),
            body,
            message_id: None,
        }
    }
}
