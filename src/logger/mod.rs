//! Logger module
//!
//! A logging setup based on `tracing-subscriber` with console output,
//! color control and selectable formats (Full, Compact, JSON).

pub mod config;

pub use config::{LogFormat, LoggerConfig};

use std::io::IsTerminal;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the logger with the given configuration
pub fn init_logger(config: &LoggerConfig) -> anyhow::Result<()> {
    config.validate()?;

    let filter = EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info"));

    let is_tty = std::io::stdout().is_terminal();
    let use_ansi = config.colored && is_tty;

    match config.format {
        LogFormat::Full => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_ansi(use_ansi)
                        .with_target(true)
                        .with_level(true),
                )
                .init();
        }
        LogFormat::Compact => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_ansi(use_ansi)
                        .with_target(true)
                        .compact(),
                )
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_ansi(false).json())
                .init();
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(LoggerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_level_rejected() {
        let config = LoggerConfig {
            level: "loud".to_string(),
            ..LoggerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_filter_directives_accepted() {
        let config = LoggerConfig {
            level: "info,courier_rs::dispatch=debug".to_string(),
            ..LoggerConfig::default()
        };
        assert!(config.validate().is_ok());
    }
}
