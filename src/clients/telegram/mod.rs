//! Telegram channel clients.

mod bot_api;

pub use bot_api::{BotApiClient, BotApiConfig};

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::clients::ProviderResponse;
use crate::error::AppResult;

/// Telegram provider capability: `send(chat_id, text)`.
#[async_trait]
pub trait TelegramClient: Send + Sync {
    async fn send(&self, chat_id: i64, text: &str) -> AppResult<ProviderResponse>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}

/// Typed gateway configuration for the telegram channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "client", rename_all = "snake_case")]
pub enum TelegramGatewayConfig {
    BotApi(BotApiConfig),
    /// Log-only client for development and tests
    Console,
}

impl TelegramGatewayConfig {
    pub fn build(&self, gateway: &str) -> AppResult<Arc<dyn TelegramClient>> {
        Ok(match self {
            TelegramGatewayConfig::BotApi(config) => {
                Arc::new(BotApiClient::new(gateway, config.clone()))
            }
            TelegramGatewayConfig::Console => Arc::new(ConsoleTelegramClient {
                gateway: gateway.to_string(),
            }),
        })
    }
}

/// Writes outbound messages to the log instead of a wire.
pub struct ConsoleTelegramClient {
    gateway: String,
}

#[async_trait]
impl TelegramClient for ConsoleTelegramClient {
    async fn send(&self, chat_id: i64, text: &str) -> AppResult<ProviderResponse> {
        info!(gateway = %self.gateway, chat_id = chat_id, text = %text, "console telegram");
        Ok(ProviderResponse::accepted())
    }

    fn name(&self) -> &'static str {
        "console"
    }
}
