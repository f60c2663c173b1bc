//! Twilio Messages API client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clients::sms::SmsClient;
use crate::clients::ProviderResponse;
use crate::error::{AppError, AppResult};
use crate::external::HTTP_CLIENT;
use crate::models::Channel;

/// Twilio gateway settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwilioConfig {
    /// Account SID
    pub account: String,
    /// Auth token
    pub token: String,
    pub from_number: String,
}

pub struct TwilioClient {
    gateway: String,
    config: TwilioConfig,
}

impl TwilioClient {
    pub fn new(gateway: &str, config: TwilioConfig) -> Self {
        Self {
            gateway: gateway.to_string(),
            config,
        }
    }

    fn api_url(&self) -> String {
        format!(
            "https://api.twilio.com/2010-04-01/Accounts/{}/Messages.json",
            self.config.account
        )
    }
}

#[derive(Debug, Deserialize)]
struct TwilioResponse {
    sid: Option<String>,
}

#[async_trait]
impl SmsClient for TwilioClient {
    async fn send(&self, number: &str, text: &str) -> AppResult<ProviderResponse> {
        debug!(gateway = %self.gateway, number = %number, "sending sms via twilio");

        let response = HTTP_CLIENT
            .post(self.api_url())
            .basic_auth(&self.config.account, Some(&self.config.token))
            .form(&[
                ("To", number),
                ("From", self.config.from_number.as_str()),
                ("Body", text),
            ])
            .send()
            .await
            .map_err(|e| AppError::delivery(Channel::Sms, &self.gateway, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::delivery(
                Channel::Sms,
                &self.gateway,
                format!("twilio returned {}: {}", status, body),
            ));
        }

        let parsed: Option<TwilioResponse> = response.json().await.ok();
        Ok(ProviderResponse {
            status_code: Some(status.as_u16()),
            body: None,
            message_id: parsed.and_then(|r| r.sid),
        })
    }

    fn name(&self) -> &'static str {
        "twilio"
    }
}
