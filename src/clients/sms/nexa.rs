//! Nexa bulk SMS client (smsvas.com).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::clients::sms::SmsClient;
use crate::clients::ProviderResponse;
use crate::error::{AppError, AppResult};
use crate::external::HTTP_CLIENT;
use crate::models::Channel;

const API_URL: &str = "https://smsvas.com/bulk/public/index.php/api/v1/sendsms";

/// Nexa gateway settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NexaConfig {
    /// Account email, Nexa's user identifier
    pub email: String,
    pub password: String,
    pub senderid: String,
}

pub struct NexaClient {
    gateway: String,
    config: NexaConfig,
}

impl NexaClient {
    pub fn new(gateway: &str, config: NexaConfig) -> Self {
        Self {
            gateway: gateway.to_string(),
            config,
        }
    }

    /// Request payload for the send endpoint. Nexa wants numbers without
    /// the leading plus.
    fn build_request_body(&self, number: &str, text: &str) -> serde_json::Value {
        json!({
            "user": self.config.email,
            "password": self.config.password,
            "senderid": self.config.senderid,
            "sms": text,
            "mobiles": number.replace('+', ""),
        })
    }
}

#[async_trait]
impl SmsClient for NexaClient {
    async fn send(&self, number: &str, text: &str) -> AppResult<ProviderResponse> {
        let body = self.build_request_body(number, text);
        debug!(gateway = %self.gateway, number = %number, "sending sms via nexa");

        let response = HTTP_CLIENT
            .post(API_URL)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::delivery(Channel::Sms, &self.gateway, e.to_string()))?;

        let status = response.status();
        let text_body = response.text().await.ok();
        if !status.is_success() {
            return Err(AppError::delivery(
                Channel::Sms,
                &self.gateway,
                format!("nexa returned {}: {}", status, text_body.unwrap_or_default()),
            ));
        }
        Ok(ProviderResponse::with_status(status.as_u16(), text_body))
    }

    fn name(&self) -> &'static str {
        "nexa"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_request_body_strips_plus() {
        let client = NexaClient::new(
            "nexa",
            NexaConfig {
                email: "ops@example.com".to_string(),
                password: "secret".to_string(),
                senderid: "COURIER".to_string(),
            },
        );
        let body = client.build_request_body("+237650000000", "Hello");
        assert_eq!(body["mobiles"], "237650000000");
        assert_eq!(body["sms"], "Hello");
        assert_eq!(body["senderid"], "COURIER");
    }
}
