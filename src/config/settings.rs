//! Configuration settings structures.
//!
//! Everything here can be loaded from TOML files and `COURIER__*`
//! environment variables. The channel tables hold typed, `client`-tagged
//! gateway configurations, so an unknown client name fails at
//! deserialization time instead of at dispatch time.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::clients::email::EmailGatewayConfig;
use crate::clients::push::PushGatewayConfig;
use crate::clients::sms::SmsGatewayConfig;
use crate::clients::telegram::TelegramGatewayConfig;
use crate::clients::whatsapp::WhatsappGatewayConfig;
use crate::config::error::ConfigError;
use crate::logger::LoggerConfig;
use crate::models::Channel;

// ============================================================================
// Default value functions
// ============================================================================

fn default_app_name() -> String {
    "courier-rs".to_string()
}

fn default_app_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_templates_dir() -> PathBuf {
    PathBuf::from("templates")
}

// ============================================================================
// Application Configuration
// ============================================================================

/// Application basic information configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Application name
    #[serde(default = "default_app_name")]
    pub name: String,

    /// Application version
    #[serde(default = "default_app_version")]
    pub version: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            version: default_app_version(),
        }
    }
}

// ============================================================================
// Channel Configuration
// ============================================================================

/// One channel's gateway table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig<G> {
    /// Gateway used when a request carries no override
    pub default_gateway: String,

    /// Gateways tried, in order, when a send fails. Only the email
    /// dispatcher walks this chain.
    #[serde(default)]
    pub fallbacks: Vec<String>,

    /// Named gateways of this channel
    pub gateways: HashMap<String, G>,
}

impl<G> ChannelConfig<G> {
    /// Resolves a gateway name (override or default) to its configuration.
    pub fn resolve(&self, channel: Channel, name: Option<&str>) -> Result<(String, &G), ConfigError> {
        let gateway = name.unwrap_or(&self.default_gateway).to_string();
        match self.gateways.get(&gateway) {
            Some(config) => Ok((gateway, config)),
            None => Err(ConfigError::validation(
                format!("channels.{}.gateways.{}", channel, gateway),
                "gateway is not configured".to_string(),
            )),
        }
    }

    fn validate(&self, channel: Channel) -> Result<(), ConfigError> {
        if !self.gateways.contains_key(&self.default_gateway) {
            return Err(ConfigError::validation(
                format!("channels.{}.default_gateway", channel),
                format!("gateway '{}' is not configured", self.default_gateway),
            ));
        }
        for fallback in &self.fallbacks {
            if !self.gateways.contains_key(fallback) {
                return Err(ConfigError::validation(
                    format!("channels.{}.fallbacks", channel),
                    format!("fallback gateway '{}' is not configured", fallback),
                ));
            }
        }
        Ok(())
    }
}

/// All channel tables. Channels left out of the configuration are simply
/// not dispatchable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChannelsConfig {
    pub email: Option<ChannelConfig<EmailGatewayConfig>>,
    pub sms: Option<ChannelConfig<SmsGatewayConfig>>,
    pub push: Option<ChannelConfig<PushGatewayConfig>>,
    pub whatsapp: Option<ChannelConfig<WhatsappGatewayConfig>>,
    pub telegram: Option<ChannelConfig<TelegramGatewayConfig>>,
}

/// Dispatcher-wide settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierConfig {
    /// Run each channel dispatch on a detached task by default
    #[serde(default)]
    pub threaded: bool,

    /// Root directory of the bundled template loader
    #[serde(default = "default_templates_dir")]
    pub templates_dir: PathBuf,

    #[serde(default)]
    pub channels: ChannelsConfig,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            threaded: false,
            templates_dir: default_templates_dir(),
            channels: ChannelsConfig::default(),
        }
    }
}

// ============================================================================
// Root Settings
// ============================================================================

/// Root application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub application: ApplicationConfig,

    #[serde(default)]
    pub logger: LoggerConfig,

    #[serde(default)]
    pub notifier: NotifierConfig,
}

impl Settings {
    /// Validate the loaded settings.
    ///
    /// Gateway references (default and fallbacks) must point at configured
    /// gateways, so resolution cannot fail later for a reason the operator
    /// could have seen at startup.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let channels = &self.notifier.channels;
        if let Some(email) = &channels.email {
            email.validate(Channel::Email)?;
        }
        if let Some(sms) = &channels.sms {
            sms.validate(Channel::Sms)?;
        }
        if let Some(push) = &channels.push {
            push.validate(Channel::Push)?;
        }
        if let Some(whatsapp) = &channels.whatsapp {
            whatsapp.validate(Channel::Whatsapp)?;
        }
        if let Some(telegram) = &channels.telegram {
            telegram.validate(Channel::Telegram)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email_channel(toml_src: &str) -> ChannelConfig<EmailGatewayConfig> {
        toml::from_str(toml_src).unwrap()
    }

    #[test]
    fn test_resolve_prefers_override() {
        let channel = email_channel(
            r#"
            default_gateway = "primary"

            [gateways.primary]
            client = "console"
            from = "a@example.com"

            [gateways.backup]
            client = "console"
            from = "b@example.com"
        "#,
        );

        let (name, _) = channel.resolve(Channel::Email, None).unwrap();
        assert_eq!(name, "primary");

        let (name, config) = channel.resolve(Channel::Email, Some("backup")).unwrap();
        assert_eq!(name, "backup");
        assert_eq!(config.from_address(), "b@example.com");
    }

    #[test]
    fn test_resolve_unknown_gateway_fails() {
        let channel = email_channel(
            r#"
            default_gateway = "primary"

            [gateways.primary]
            client = "console"
            from = "a@example.com"
        "#,
        );
        assert!(channel.resolve(Channel::Email, Some("missing")).is_err());
    }

    #[test]
    fn test_validate_rejects_dangling_default() {
        let mut settings = Settings::default();
        settings.notifier.channels.email = Some(email_channel(
            r#"
            default_gateway = "ghost"

            [gateways.primary]
            client = "console"
            from = "a@example.com"
        "#,
        ));
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_dangling_fallback() {
        let mut settings = Settings::default();
        settings.notifier.channels.email = Some(email_channel(
            r#"
            default_gateway = "primary"
            fallbacks = ["ghost"]

            [gateways.primary]
            client = "console"
            from = "a@example.com"
        "#,
        ));
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_full_settings_from_toml() {
        let settings: Settings = toml::from_str(
            r#"
            [application]
            name = "courier-test"

            [logger]
            level = "debug"
            format = "json"
            colored = false

            [notifier]
            threaded = true

            [notifier.channels.sms]
            default_gateway = "nexa"

            [notifier.channels.sms.gateways.nexa]
            client = "nexa"
            email = "ops@example.com"
            password = "secret"
            senderid = "COURIER"
        "#,
        )
        .unwrap();

        assert!(settings.notifier.threaded);
        assert!(settings.validate().is_ok());
        let sms = settings.notifier.channels.sms.unwrap();
        assert_eq!(sms.default_gateway, "nexa");
    }
}
