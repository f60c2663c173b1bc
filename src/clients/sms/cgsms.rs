//! CheapGlobalSMS client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clients::sms::SmsClient;
use crate::clients::ProviderResponse;
use crate::error::{AppError, AppResult};
use crate::external::HTTP_CLIENT;
use crate::models::Channel;

const API_URL: &str = "http://cheapglobalsms.com/api_v1";

/// CheapGlobalSMS gateway settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CgsmsConfig {
    pub sub_account: String,
    pub sub_account_pass: String,
}

pub struct CgsmsClient {
    gateway: String,
    config: CgsmsConfig,
}

impl CgsmsClient {
    pub fn new(gateway: &str, config: CgsmsConfig) -> Self {
        Self {
            gateway: gateway.to_string(),
            config,
        }
    }

    fn query_params<'a>(&'a self, number: &'a str, text: &'a str) -> [(&'static str, &'a str); 5] {
        [
            ("sub_account", self.config.sub_account.as_str()),
            ("sub_account_pass", self.config.sub_account_pass.as_str()),
            ("action", "send_sms"),
            ("message", text),
            ("recipients", number),
        ]
    }
}

#[async_trait]
impl SmsClient for CgsmsClient {
    async fn send(&self, number: &str, text: &str) -> AppResult<ProviderResponse> {
        debug!(gateway = %self.gateway, number = %number, "sending sms via cgsms");

        let response = HTTP_CLIENT
            .get(API_URL)
            .query(&self.query_params(number, text))
            .send()
            .await
            .map_err(|e| AppError::delivery(Channel::Sms, &self.gateway, e.to_string()))?;

        let status = response.status();
        let body = response.text().await.ok();
        if !status.is_success() {
            return Err(AppError::delivery(
                Channel::Sms,
                &self.gateway,
                format!("cgsms returned {}: {}", status, body.unwrap_or_default()),
            ));
        }
        Ok(ProviderResponse::with_status(status.as_u16(), body))
    }

    fn name(&self) -> &'static str {
        "cgsms"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_params_carry_action() {
        let client = CgsmsClient::new(
            "cg",
            CgsmsConfig {
                sub_account: "acc".to_string(),
                sub_account_pass: "pass".to_string(),
            },
        );
        let params = client.query_params("+1555", "hey");
        assert!(params.contains(&("action", "send_sms")));
        assert!(params.contains(&("recipients", "+1555")));
    }
}
