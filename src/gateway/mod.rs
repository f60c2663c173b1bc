//! Gateway resolution.
//!
//! Maps a channel plus an optional gateway override to the gateway name,
//! its typed configuration and a constructed client. Every miss is a fatal
//! configuration error raised before any send attempt, never per-recipient.

use std::sync::Arc;

use crate::clients::email::EmailClient;
use crate::clients::push::PushClient;
use crate::clients::sms::SmsClient;
use crate::clients::telegram::TelegramClient;
use crate::clients::whatsapp::WhatsappClient;
use crate::config::{ChannelConfig, ChannelsConfig, ConfigError};
use crate::error::{AppError, AppResult};
use crate::models::Channel;

/// A resolved email gateway: name and client. The sender address lives
/// inside the client, bound at construction.
pub struct ResolvedEmail {
    pub gateway: String,
    pub client: Arc<dyn EmailClient>,
}

pub struct ResolvedSms {
    pub gateway: String,
    pub client: Arc<dyn SmsClient>,
}

impl std::fmt::Debug for ResolvedEmail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedEmail")
            .field("gateway", &self.gateway)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for ResolvedSms {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedSms")
            .field("gateway", &self.gateway)
            .finish_non_exhaustive()
    }
}

pub struct ResolvedPush {
    pub gateway: String,
    pub client: Arc<dyn PushClient>,
}

pub struct ResolvedWhatsapp {
    pub gateway: String,
    pub client: Arc<dyn WhatsappClient>,
}

pub struct ResolvedTelegram {
    pub gateway: String,
    pub client: Arc<dyn TelegramClient>,
}

/// Resolves gateways against the immutable channel configuration.
#[derive(Debug, Clone)]
pub struct GatewayRegistry {
    channels: Arc<ChannelsConfig>,
}

fn missing_channel(channel: Channel) -> AppError {
    AppError::configuration(
        format!("channels.{}", channel),
        "channel is not configured",
    )
}

fn config_error(err: ConfigError) -> AppError {
    match err {
        ConfigError::ValidationError { field, message } => AppError::configuration(field, message),
        other => AppError::configuration("channels", other.to_string()),
    }
}

fn channel_of<G>(
    config: &Option<ChannelConfig<G>>,
    channel: Channel,
) -> AppResult<&ChannelConfig<G>> {
    config.as_ref().ok_or_else(|| missing_channel(channel))
}

impl GatewayRegistry {
    pub fn new(channels: ChannelsConfig) -> Self {
        Self {
            channels: Arc::new(channels),
        }
    }

    /// Fallback gateway names of the email channel, in configured order.
    pub fn email_fallbacks(&self) -> &[String] {
        self.channels
            .email
            .as_ref()
            .map(|c| c.fallbacks.as_slice())
            .unwrap_or_default()
    }

    pub fn email(&self, gateway: Option<&str>) -> AppResult<ResolvedEmail> {
        let channel = channel_of(&self.channels.email, Channel::Email)?;
        let (name, config) = channel
            .resolve(Channel::Email, gateway)
            .map_err(config_error)?;
        Ok(ResolvedEmail {
            client: config.build(&name)?,
            gateway: name,
        })
    }

    pub fn sms(&self, gateway: Option<&str>) -> AppResult<ResolvedSms> {
        let channel = channel_of(&self.channels.sms, Channel::Sms)?;
        let (name, config) = channel
            .resolve(Channel::Sms, gateway)
            .map_err(config_error)?;
        Ok(ResolvedSms {
            client: config.build(&name)?,
            gateway: name,
        })
    }

    pub fn push(&self, gateway: Option<&str>) -> AppResult<ResolvedPush> {
        let channel = channel_of(&self.channels.push, Channel::Push)?;
        let (name, config) = channel
            .resolve(Channel::Push, gateway)
            .map_err(config_error)?;
        Ok(ResolvedPush {
            client: config.build(&name)?,
            gateway: name,
        })
    }

    pub fn whatsapp(&self, gateway: Option<&str>) -> AppResult<ResolvedWhatsapp> {
        let channel = channel_of(&self.channels.whatsapp, Channel::Whatsapp)?;
        let (name, config) = channel
            .resolve(Channel::Whatsapp, gateway)
            .map_err(config_error)?;
        Ok(ResolvedWhatsapp {
            client: config.build(&name)?,
            gateway: name,
        })
    }

    pub fn telegram(&self, gateway: Option<&str>) -> AppResult<ResolvedTelegram> {
        let channel = channel_of(&self.channels.telegram, Channel::Telegram)?;
        let (name, config) = channel
            .resolve(Channel::Telegram, gateway)
            .map_err(config_error)?;
        Ok(ResolvedTelegram {
            client: config.build(&name)?,
            gateway: name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> GatewayRegistry {
        let channels: ChannelsConfig = toml::from_str(
            r#"
            [email]
            default_gateway = "primary"
            fallbacks = ["backup"]

            [email.gateways.primary]
            client = "console"
            from = "primary@example.com"

            [email.gateways.backup]
            client = "console"
            from = "backup@example.com"
        "#,
        )
        .unwrap();
        GatewayRegistry::new(channels)
    }

    #[test]
    fn test_default_gateway_resolution() {
        let resolved = registry().email(None).unwrap();
        assert_eq!(resolved.gateway, "primary");
        assert_eq!(resolved.client.name(), "console");
    }

    #[test]
    fn test_override_beats_default() {
        let resolved = registry().email(Some("backup")).unwrap();
        assert_eq!(resolved.gateway, "backup");
    }

    #[test]
    fn test_missing_gateway_is_configuration_error() {
        let err = registry().email(Some("ghost")).unwrap_err();
        assert!(matches!(err, AppError::Configuration { .. }));
    }

    #[test]
    fn test_missing_channel_is_configuration_error() {
        let err = registry().sms(None).unwrap_err();
        assert!(matches!(err, AppError::Configuration { .. }));
    }

    #[test]
    fn test_fallback_order_preserved() {
        assert_eq!(registry().email_fallbacks(), ["backup"]);
    }
}
