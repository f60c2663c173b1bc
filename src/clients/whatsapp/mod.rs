//! WhatsApp channel clients.

mod waha;

pub use waha::{WahaClient, WahaConfig};

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::clients::ProviderResponse;
use crate::error::AppResult;

/// WhatsApp provider capability: `send(number, text)`.
#[async_trait]
pub trait WhatsappClient: Send + Sync {
    async fn send(&self, number: &str, text: &str) -> AppResult<ProviderResponse>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}

/// Typed gateway configuration for the whatsapp channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "client", rename_all = "snake_case")]
pub enum WhatsappGatewayConfig {
    Waha(WahaConfig),
    /// Log-only client for development and tests
    Console,
}

impl WhatsappGatewayConfig {
    pub fn build(&self, gateway: &str) -> AppResult<Arc<dyn WhatsappClient>> {
        Ok(match self {
            WhatsappGatewayConfig::Waha(config) => {
                Arc::new(WahaClient::new(gateway, config.clone()))
            }
            WhatsappGatewayConfig::Console => Arc::new(ConsoleWhatsappClient {
                gateway: gateway.to_string(),
            }),
        })
    }
}

/// Writes outbound messages to the log instead of a wire.
pub struct ConsoleWhatsappClient {
    gateway: String,
}

#[async_trait]
impl WhatsappClient for ConsoleWhatsappClient {
    async fn send(&self, number: &str, text: &str) -> AppResult<ProviderResponse> {
        info!(gateway = %self.gateway, number = %number, text = %text, "console whatsapp");
        Ok(ProviderResponse::accepted())
    }

    fn name(&self) -> &'static str {
        "console"
    }
}
