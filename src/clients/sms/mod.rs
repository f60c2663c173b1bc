//! SMS channel clients.

mod cgsms;
mod nexa;
mod twilio;

pub use cgsms::{CgsmsClient, CgsmsConfig};
pub use nexa::{NexaClient, NexaConfig};
pub use twilio::{TwilioClient, TwilioConfig};

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::clients::ProviderResponse;
use crate::error::AppResult;

/// SMS provider capability: `send(number, text)`.
#[async_trait]
pub trait SmsClient: Send + Sync {
    async fn send(&self, number: &str, text: &str) -> AppResult<ProviderResponse>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}

/// Typed gateway configuration for the sms channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "client", rename_all = "snake_case")]
pub enum SmsGatewayConfig {
    Nexa(NexaConfig),
    Cgsms(CgsmsConfig),
    Twilio(TwilioConfig),
    /// Log-only client for development and tests
    Console,
}

impl SmsGatewayConfig {
    pub fn build(&self, gateway: &str) -> AppResult<Arc<dyn SmsClient>> {
        Ok(match self {
            SmsGatewayConfig::Nexa(config) => Arc::new(NexaClient::new(gateway, config.clone())),
            SmsGatewayConfig::Cgsms(config) => Arc::new(CgsmsClient::new(gateway, config.clone())),
            SmsGatewayConfig::Twilio(config) => {
                Arc::new(TwilioClient::new(gateway, config.clone()))
            }
            SmsGatewayConfig::Console => Arc::new(ConsoleSmsClient {
                gateway: gateway.to_string(),
            }),
        })
    }
}

/// Writes outbound messages to the log instead of a wire.
pub struct ConsoleSmsClient {
    gateway: String,
}

#[async_trait]
impl SmsClient for ConsoleSmsClient {
    async fn send(&self, number: &str, text: &str) -> AppResult<ProviderResponse> {
        info!(gateway = %self.gateway, number = %number, text = %text, "console sms");
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
        let nexa: SmsGatewayConfig = toml::from_str(
            r#"
            client = "nexa"
            email = "ops@example.com"
            password = "secret"
            senderid = "COURIER"
        "#,
        )
        .unwrap();
        assert!(matches!(nexa, SmsGatewayConfig::Nexa(_)));

        let console: SmsGatewayConfig = toml::from_str(r#"client = "console""#).unwrap();
        assert!(matches!(console, SmsGatewayConfig::Console));
    }

    #[test]
    fn test_unknown_client_tag_rejected() {
        assert!(toml::from_str::<SmsGatewayConfig>(r#"client = "morse""#).is_err());
    }
}
