//! Telegram Bot API client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::clients::telegram::TelegramClient;
use crate::clients::ProviderResponse;
use crate::error::{AppError, AppResult};
use crate::external::HTTP_CLIENT;
use crate::models::Channel;

/// Bot API gateway settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotApiConfig {
    pub bot_token: String,
    /// Optional parse mode, e.g. "HTML" or "MarkdownV2"
    #[serde(default)]
    pub parse_mode: Option<String>,
}

pub struct BotApiClient {
    gateway: String,
    config: BotApiConfig,
}

#[derive(Debug, Deserialize)]
struct BotApiResponse {
    ok: bool,
    description: Option<String>,
    result: Option<BotApiMessage>,
}

#[derive(Debug, Deserialize)]
struct BotApiMessage {
    message_id: i64,
}

impl BotApiClient {
    pub fn new(gateway: &str, config: BotApiConfig) -> Self {
        Self {
            gateway: gateway.to_string(),
            config,
        }
    }

    fn api_url(&self) -> String {
        format!(
            "https://api.telegram.org/bot{}/sendMessage",
            self.config.bot_token
        )
    }

    fn build_request_body(&self, chat_id: i64, text: &str) -> serde_json::Value {
        let mut body = json!({"chat_id": chat_id, "text": text});
        if let Some(mode) = &self.config.parse_mode {
            body["parse_mode"] = json!(mode);
        }
        body
    }
}

#[async_trait]
impl TelegramClient for BotApiClient {
    async fn send(&self, chat_id: i64, text: &str) -> AppResult<ProviderResponse> {
        debug!(gateway = %self.gateway, chat_id = chat_id, "sending telegram message");

        let response = HTTP_CLIENT
            .post(self.api_url())
            .json(&self.build_request_body(chat_id, text))
            .send()
            .await
            .map_err(|e| AppError::delivery(Channel::Telegram, &self.gateway, e.to_string()))?;

        let status = response.status();
        let parsed: BotApiResponse = response.json().await.map_err(|e| {
            AppError::delivery(
                Channel::Telegram,
                &self.gateway,
                format!("bad bot api response: {}", e),
            )
        })?;

        if !parsed.ok {
            return Err(AppError::delivery(
                Channel::Telegram,
                &self.gateway,
                parsed
                    .description
                    .unwrap_or_else(|| format!("bot api returned {}", status)),
            ));
        }

        Ok(ProviderResponse {
            status_code: Some(status.as_u16()),
            body: None,
            message_id: parsed.result.map(|m| m.message_id.to_string()),
        })
    }

    fn name(&self) -> &'static str {
        "bot_api"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> BotApiClient {
        BotApiClient::new(
            "bot",
            BotApiConfig {
                bot_token: "123:abc".to_string(),
                parse_mode: Some("HTML".to_string()),
            },
        )
    }

    #[test]
    fn test_api_url_embeds_token() {
        assert_eq!(
            client().api_url(),
            "https://api.telegram.org/bot123:abc/sendMessage"
        );
    }

    #[test]
    fn test_request_body_carries_parse_mode() {
        let body = client().build_request_body(42, "hey");
        assert_eq!(body["chat_id"], 42);
        assert_eq!(body["text"], "hey");
        assert_eq!(body["parse_mode"], "HTML");
    }
}
