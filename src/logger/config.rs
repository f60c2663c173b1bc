//! Configuration types for the logger

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::Level;

/// Output format for log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable single-line output
    Full,
    /// Abbreviated single-line output
    Compact,
    /// Structured JSON output
    Json,
}

impl Default for LogFormat {
    fn default() -> Self {
        LogFormat::Full
    }
}

/// Main logger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggerConfig {
    /// Level filter, also accepts env-filter directives like
    /// `info,courier_rs::dispatch=debug`
    pub level: String,
    pub format: LogFormat,
    pub colored: bool,
}

impl LoggerConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.parse_level()
            .with_context(|| format!("Invalid log level: {}", self.level))?;
        Ok(())
    }

    /// Parse the base log level string into a tracing::Level
    pub fn parse_level(&self) -> Result<Level> {
        let base = self.level.split(',').next().unwrap_or("info");
        match base.to_lowercase().as_str() {
            "trace" => Ok(Level::TRACE),
            "debug" => Ok(Level::DEBUG),
            "info" => Ok(Level::INFO),
            "warn" => Ok(Level::WARN),
            "error" => Ok(Level::ERROR),
            other => anyhow::bail!(
                "Invalid log level '{}'. Valid levels are: trace, debug, info, warn, error",
                other
            ),
        }
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
            colored: true,
        }
    }
}
