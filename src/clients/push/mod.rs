//! Push channel clients.

mod expo;
mod fcm;

pub use expo::ExpoClient;
pub use fcm::{FcmClient, FcmConfig};

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::clients::ProviderResponse;
use crate::error::AppResult;
use crate::models::{Notification, Recipient};

/// Push provider capability.
///
/// Push clients receive the persisted record rather than a rendered string,
/// plus the fields to strip from the payload before transmission.
#[async_trait]
pub trait PushClient: Send + Sync {
    async fn send(
        &self,
        user: &Recipient,
        notification: &Notification,
        remove_fields: &[String],
    ) -> AppResult<ProviderResponse>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}

/// Typed gateway configuration for the push channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "client", rename_all = "snake_case")]
pub enum PushGatewayConfig {
    Expo,
    Fcm(FcmConfig),
    /// Log-only client for development and tests
    Console,
}

impl PushGatewayConfig {
    pub fn build(&self, gateway: &str) -> AppResult<Arc<dyn PushClient>> {
        Ok(match self {
            PushGatewayConfig::Expo => Arc::new(ExpoClient::new(gateway)),
            PushGatewayConfig::Fcm(config) => Arc::new(FcmClient::new(gateway, config.clone())),
            PushGatewayConfig::Console => Arc::new(ConsolePushClient {
                gateway: gateway.to_string(),
            }),
        })
    }
}

/// Writes outbound pushes to the log instead of a wire.
pub struct ConsolePushClient {
    gateway: String,
}

#[async_trait]
impl PushClient for ConsolePushClient {
    async fn send(
        &self,
        user: &Recipient,
        notification: &Notification,
        remove_fields: &[String],
    ) -> AppResult<ProviderResponse> {
        let payload = notification.to_redacted_json(remove_fields);
        info!(
            gateway = %self.gateway,
            user = %user.username,
            payload = %payload,
            "console push"
        );
        Ok(ProviderResponse::accepted())
    }

    fn name(&self) -> &'static str {
        "console"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tagged_configs_parse() {
        let expo: PushGatewayConfig = toml::from_str(r#"client = "expo""#).unwrap();
        assert!(matches!(expo, PushGatewayConfig::Expo));

        let fcm: PushGatewayConfig = toml::from_str(
            r#"
            client = "fcm"
            server_key = "AAA"
        "#,
        )
        .unwrap();
        assert!(matches!(fcm, PushGatewayConfig::Fcm(_)));
    }
}
