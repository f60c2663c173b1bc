//! Log-only email client for development and tests.

use async_trait::async_trait;
use tracing::info;

use crate::clients::email::{EmailClient, EmailMessage};
use crate::clients::ProviderResponse;
use crate::error::AppResult;

/// Writes outbound emails to the log instead of a wire.
pub struct ConsoleEmailClient {
    gateway: String,
    from: String,
}

impl ConsoleEmailClient {
    pub fn new(gateway: &str, from: String) -> Self {
        Self {
            gateway: gateway.to_string(),
            from,
        }
    }
}

#[async_trait]
impl EmailClient for ConsoleEmailClient {
    async fn send(&self, message: &EmailMessage) -> AppResult<ProviderResponse> {
        info!(
            gateway = %self.gateway,
            from = %self.from,
            to = %message.to,
            subject = %message.subject,
            body = %message.text_body,
            "console email"
        );
        Ok(ProviderResponse::accepted())
    }

    fn name(&self) -> &'static str {
        "console"
    }
}
