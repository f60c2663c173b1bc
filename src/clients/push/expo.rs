//! Expo push client (exp.host API).

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::clients::push::PushClient;
use crate::clients::ProviderResponse;
use crate::error::{AppError, AppResult};
use crate::external::HTTP_CLIENT;
use crate::models::{Channel, Notification, Recipient};

const API_URL: &str = "https://exp.host/--/api/v2/push/send";

pub struct ExpoClient {
    gateway: String,
}

impl ExpoClient {
    pub fn new(gateway: &str) -> Self {
        Self {
            gateway: gateway.to_string(),
        }
    }

    fn build_request_body(token: &str, notification: &Notification) -> serde_json::Value {
        json!({
            "to": token,
            "sound": "default",
            "title": notification.subject,
            "body": notification.text,
            "data": notification.data,
        })
    }
}

#[async_trait]
impl PushClient for ExpoClient {
    async fn send(
        &self,
        user: &Recipient,
        notification: &Notification,
        _remove_fields: &[String],
    ) -> AppResult<ProviderResponse> {
        let mut last_status = None;
        for token in &user.push_tokens {
            debug!(gateway = %self.gateway, user = %user.username, token = %token, "expo push");

            let response = HTTP_CLIENT
                .post(API_URL)
                .json(&Self::build_request_body(token, notification))
                .send()
                .await
                .map_err(|e| AppError::delivery(Channel::Push, &self.gateway, e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(AppError::delivery(
                    Channel::Push,
                    &self.gateway,
                    format!("expo returned {}: {}", status, body),
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
        "expo"
    }
}
