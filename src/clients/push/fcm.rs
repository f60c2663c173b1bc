//! Firebase Cloud Messaging client (legacy HTTP API).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::clients::push::PushClient;
use crate::clients::ProviderResponse;
use crate::error::{AppError, AppResult};
use crate::external::HTTP_CLIENT;
use crate::models::{Channel, Notification, Recipient};

const API_URL: &str = "https://fcm.googleapis.com/fcm/send";

/// FCM gateway settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FcmConfig {
    pub server_key: String,
}

pub struct FcmClient {
    gateway: String,
    config: FcmConfig,
}

impl FcmClient {
    pub fn new(gateway: &str, config: FcmConfig) -> Self {
        Self {
            gateway: gateway.to_string(),
            config,
        }
    }

    /// FCM data payloads carry the whole record minus the redacted fields.
    fn build_request_body(
        token: &str,
        notification: &Notification,
        remove_fields: &[String],
    ) -> serde_json::Value {
        json!({
            "to": token,
            "notification": {
                "title": notification.subject,
                "body": notification.text,
            },
            "data": notification.to_redacted_json(remove_fields),
        })
    }
}

#[async_trait]
impl PushClient for FcmClient {
    async fn send(
        &self,
        user: &Recipient,
        notification: &Notification,
        remove_fields: &[String],
    ) -> AppResult<ProviderResponse> {
        let mut last_status = None;
        for token in &user.push_tokens {
            debug!(gateway = %self.gateway, user = %user.username, "fcm push");

            let response = HTTP_CLIENT
                .post(API_URL)
                .header(
                    "Authorization",
                    format!("key={}", self.config.server_key),
                )
                .json(&Self::build_request_body(token, notification, remove_fields))
                .send()
                .await
                .map_err(|e| AppError::delivery(Channel::Push, &self.gateway, e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(AppError::delivery(
                    Channel::Push,
                    &self.gateway,
                    format!("fcm returned {}: {}", status, body),
                ));
            }
            last_status = Some(status.as_u16());
        }
        Ok(ProviderResponse {
            status_code: last_status,
            body: None,
            message_id: None,
        })
    }

    fn name(&self) -> &'static str {
        "fcm"
    }
}
