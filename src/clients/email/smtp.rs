//! SMTP email client.
//!
//! Sends through an async SMTP transport built from the gateway
//! configuration. Transport construction happens once, at dispatcher
//! setup, so broken settings fail before any send attempt.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clients::email::{EmailClient, EmailMessage};
use crate::clients::ProviderResponse;
use crate::error::{AppError, AppResult};
use crate::models::Channel;

fn default_port() -> u16 {
    587
}

/// SMTP gateway settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub from: String,
    /// STARTTLS on the submission port
    #[serde(default)]
    pub use_tls: bool,
    /// Implicit TLS (typically port 465)
    #[serde(default)]
    pub use_ssl: bool,
}

/// Email client speaking SMTP via lettre's async transport.
pub struct SmtpEmailClient {
    gateway: String,
    from: Mailbox,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl std::fmt::Debug for SmtpEmailClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpEmailClient")
            .field("gateway", &self.gateway)
            .field("from", &self.from)
            .finish_non_exhaustive()
    }
}

impl SmtpEmailClient {
    pub fn new(gateway: &str, config: SmtpConfig) -> AppResult<Self> {
        let from: Mailbox = config.from.parse().map_err(|_| {
            AppError::configuration(
                format!("channels.email.gateways.{}.from", gateway),
                format!("'{}' is not a valid mailbox", config.from),
            )
        })?;

        let mut builder = if config.use_ssl {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
        } else if config.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
        } else {
            Ok(AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(
                &config.host,
            ))
        }
        .map_err(|e| {
            AppError::configuration(
                format!("channels.email.gateways.{}.host", gateway),
                e.to_string(),
            )
        })?
        .port(config.port);

        if !config.username.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ));
        }

        Ok(Self {
            gateway: gateway.to_string(),
            from,
            transport: builder.build(),
        })
    }

    fn delivery_error(&self, reason: impl Into<String>) -> AppError {
        AppError::delivery(Channel::Email, &self.gateway, reason)
    }
}

#[async_trait]
impl EmailClient for SmtpEmailClient {
    async fn send(&self, message: &EmailMessage) -> AppResult<ProviderResponse> {
        let to: Mailbox = message
            .to
            .parse()
            .map_err(|_| self.delivery_error(format!("'{}' is not a valid mailbox", message.to)))?;

        let builder = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(&message.subject);

        let email = match &message.html_body {
            Some(html) => builder
                .multipart(MultiPart::alternative_plain_html(
                    message.text_body.clone(),
                    html.clone(),
                ))
                .map_err(|e| self.delivery_error(e.to_string()))?,
            None => builder
                .header(ContentType::TEXT_PLAIN)
                .body(message.text_body.clone())
                .map_err(|e| self.delivery_error(e.to_string()))?,
        };

        let response = self
            .transport
            .send(email)
            .await
            .map_err(|e| self.delivery_error(e.to_string()))?;

        debug!(gateway = %self.gateway, to = %message.to, "smtp accepted message");
        Ok(ProviderResponse {
            status_code: None,
            body: response.first_line().map(str::to_string),
            message_id: None,
        })
    }

    fn name(&self) -> &'static str {
        "smtp"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SmtpConfig {
        SmtpConfig {
            host: "smtp.example.com".to_string(),
            port: 587,
            username: "mailer".to_string(),
            password: "secret".to_string(),
            from: "Notifier <noreply@example.com>".to_string(),
            use_tls: true,
            use_ssl: false,
        }
    }

    #[test]
    fn test_construction_parses_from_mailbox() {
        let client = SmtpEmailClient::new("primary", config()).unwrap();
        assert_eq!(client.from.email.to_string(), "noreply@example.com");
    }

    #[test]
    fn test_bad_from_is_configuration_error() {
        let mut bad = config();
        bad.from = "not a mailbox".to_string();
        let err = SmtpEmailClient::new("primary", bad).unwrap_err();
        assert!(matches!(err, AppError::Configuration { .. }));
    }
}
