//! WAHA (WhatsApp HTTP API) client.
//!
//! Mirrors the WAHA conversation flow: verify the number exists, simulate
//! typing for a few seconds, then send the text.

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use crate::clients::whatsapp::WhatsappClient;
use crate::clients::ProviderResponse;
use crate::error::{AppError, AppResult};
use crate::external::HTTP_CLIENT;
use crate::models::Channel;

fn default_session() -> String {
    "default".to_string()
}

fn default_true() -> bool {
    true
}

/// WAHA gateway settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WahaConfig {
    pub base_url: String,
    #[serde(default = "default_session")]
    pub session: String,
    /// Typing simulation makes the sender look less bot-like
    #[serde(default = "default_true")]
    pub simulate_typing: bool,
}

pub struct WahaClient {
    gateway: String,
    config: WahaConfig,
}

#[derive(Debug, Deserialize)]
struct CheckExists {
    #[serde(rename = "numberExists")]
    number_exists: bool,
    #[serde(rename = "chatId")]
    chat_id: Option<String>,
}

impl WahaClient {
    pub fn new(gateway: &str, config: WahaConfig) -> Self {
        Self {
            gateway: gateway.to_string(),
            config,
        }
    }

    /// WhatsApp chat addresses are the bare number with a `@c.us` suffix.
    fn chat_address(number: &str) -> String {
        format!("{}@c.us", number.replace('+', ""))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn delivery_error(&self, reason: impl Into<String>) -> AppError {
        AppError::delivery(Channel::Whatsapp, &self.gateway, reason)
    }
}

#[async_trait]
impl WhatsappClient for WahaClient {
    async fn send(&self, number: &str, text: &str) -> AppResult<ProviderResponse> {
        let wa_number = Self::chat_address(number);

        debug!(gateway = %self.gateway, number = %wa_number, "checking whatsapp number");
        let response = HTTP_CLIENT
            .get(self.url("/api/contacts/check-exists"))
            .query(&[
                ("phone", wa_number.as_str()),
                ("session", self.config.session.as_str()),
            ])
            .send()
            .await
            .map_err(|e| self.delivery_error(e.to_string()))?;

        let check: CheckExists = response
            .json()
            .await
            .map_err(|e| self.delivery_error(format!("bad check-exists response: {}", e)))?;

        if !check.number_exists {
            return Err(self.delivery_error(format!("number {} is not on whatsapp", number)));
        }
        let chat_id = check.chat_id.unwrap_or(wa_number);

        if self.config.simulate_typing {
            let typing = json!({"chatId": chat_id, "session": self.config.session});

            info!(gateway = %self.gateway, chat = %chat_id, "start typing");
            HTTP_CLIENT
                .post(self.url("/api/startTyping"))
                .json(&typing)
                .send()
                .await
                .map_err(|e| self.delivery_error(e.to_string()))?;

            let secs = rand::rng().random_range(5..=10);
            tokio::time::sleep(Duration::from_secs(secs)).await;

            info!(gateway = %self.gateway, chat = %chat_id, "stop typing");
            HTTP_CLIENT
                .post(self.url("/api/stopTyping"))
                .json(&typing)
                .send()
                .await
                .map_err(|e| self.delivery_error(e.to_string()))?;
        }

        info!(gateway = %self.gateway, chat = %chat_id, "sending whatsapp message");
        let response = HTTP_CLIENT
            .post(self.url("/api/sendText"))
            .json(&json!({
                "chatId": chat_id,
                "session": self.config.session,
                "text": text,
            }))
            .send()
            .await
            .map_err(|e| self.delivery_error(e.to_string()))?;

        let status = response.status();
        let body = response.text().await.ok();
        if !status.is_success() {
            return Err(self.delivery_error(format!(
                "waha returned {}: {}",
                status,
                body.unwrap_or_default()
            )));
        }
        Ok(ProviderResponse::with_status(status.as_u16(), body))
    }

    fn name(&self) -> &'static str {
        "waha"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_address_strips_plus() {
        assert_eq!(WahaClient::chat_address("+237650000000"), "237650000000@c.us");
    }

    #[test]
    fn test_url_joins_without_double_slash() {
        let client = WahaClient::new(
            "waha",
            WahaConfig {
                base_url: "http://localhost:3000/".to_string(),
                session: "default".to_string(),
                simulate_typing: false,
            },
        );
        assert_eq!(
            client.url("/api/sendText"),
            "http://localhost:3000/api/sendText"
        );
    }
}
