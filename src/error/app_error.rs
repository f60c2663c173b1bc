use thiserror::Error;

use crate::models::Channel;

/// Application-wide error type covering every failure class of the
/// dispatcher.
///
/// Only `Configuration` and `Validation` ever reach the caller of
/// `Notifier::notify`; delivery failures are absorbed into the per-channel
/// report at the dispatch layer.
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing channel, gateway or client at setup. Fatal, raised before
    /// any send attempt.
    #[error("Configuration error: {key}: {reason}")]
    Configuration { key: String, reason: String },

    /// Invalid request input, raised before any network call.
    #[error("Validation failed for {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Template lookup miss. Drives the per-channel template fallback
    /// (telegram/whatsapp fall back to the sms template).
    #[error("Template not found: {name}")]
    TemplateNotFound { name: String },

    /// Template rendered but produced unusable output, or the engine failed.
    #[error("Template error in {name}: {reason}")]
    Template { name: String, reason: String },

    /// Provider call failed. Caught at the dispatch layer and recorded in
    /// the channel report; triggers the fallback chain for email.
    #[error("Delivery failed via {channel}/{gateway}: {reason}")]
    Delivery {
        channel: Channel,
        gateway: String,
        reason: String,
    },

    /// Notification store operation failed.
    #[error("Store operation failed: {operation}")]
    Store {
        operation: String,
        #[source]
        source: anyhow::Error,
    },

    /// Internal error for unexpected failures.
    #[error("Internal error")]
    Internal {
        #[source]
        source: anyhow::Error,
    },
}

impl AppError {
    /// Shorthand for a configuration error.
    pub fn configuration(key: impl Into<String>, reason: impl Into<String>) -> Self {
        AppError::Configuration {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for a validation error.
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for a delivery error.
    pub fn delivery(
        channel: Channel,
        gateway: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        AppError::Delivery {
            channel,
            gateway: gateway.into(),
            reason: reason.into(),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        AppError::Internal { source: error }
    }
}

/// Type alias for Result with AppError to simplify function signatures
pub type AppResult<T> = Result<T, AppError>;
