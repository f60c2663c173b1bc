//! Email channel clients.

mod console;
mod smtp;

pub use console::ConsoleEmailClient;
pub use smtp::{SmtpConfig, SmtpEmailClient};

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::clients::ProviderResponse;
use crate::error::AppResult;

/// One outbound email.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub text_body: String,
    /// Attached as the text/html alternative when present
    pub html_body: Option<String>,
}

/// Email provider capability.
#[async_trait]
pub trait EmailClient: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> AppResult<ProviderResponse>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}

/// Typed gateway configuration for the email channel.
///
/// Amazon SES deployments use the `smtp` client against the SES SMTP
/// interface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "client", rename_all = "snake_case")]
pub enum EmailGatewayConfig {
    Smtp(SmtpConfig),
    /// Log-only client for development and tests
    Console { from: String },
}

impl EmailGatewayConfig {
    /// Constructs the client for this gateway. Fails fast on unusable
    /// transport settings.
    pub fn build(&self, gateway: &str) -> AppResult<Arc<dyn EmailClient>> {
        match self {
            EmailGatewayConfig::Smtp(config) => {
                Ok(Arc::new(SmtpEmailClient::new(gateway, config.clone())?))
            }
            EmailGatewayConfig::Console { from } => {
                Ok(Arc::new(ConsoleEmailClient::new(gateway, from.clone())))
            }
        }
    }

    /// Sender address for this gateway.
    pub fn from_address(&self) -> &str {
        match self {
            EmailGatewayConfig::Smtp(config) => &config.from,
            EmailGatewayConfig::Console { from } => from,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_client_tag_rejected() {
        let table = r#"
            client = "carrier_pigeon"
            from = "a@b.c"
        "#;
        assert!(toml::from_str::<EmailGatewayConfig>(table).is_err());
    }

    #[test]
    fn test_console_config_parses() {
        let table = r#"
            client = "console"
            from = "noreply@example.com"
        "#;
        let config: EmailGatewayConfig = toml::from_str(table).unwrap();
        assert_eq!(config.from_address(), "noreply@example.com");
    }

    #[test]
    fn test_smtp_config_parses() {
        let table = r#"
            client = "smtp"
            host = "smtp.example.com"
            port = 587
            username = "mailer"
            password = "secret"
            from = "noreply@example.com"
            use_tls = true
        "#;
        let config: EmailGatewayConfig = toml::from_str(table).unwrap();
        assert!(matches!(config, EmailGatewayConfig::Smtp(_)));
    }
}
