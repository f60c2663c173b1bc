//! Content rendering for per-channel message bodies.
//!
//! The template engine of record is an external collaborator; this module
//! defines the [`TemplateEngine`] seam, the per-channel template filename
//! conventions, and the graceful fallback from a channel-specific template
//! to the sms template. Two bundled engines (directory-backed and
//! in-memory) cover the CLI and tests.

mod engine;

pub use engine::{DirTemplates, MapTemplates};

use serde_json::{Map, Value as JsonValue};

use crate::error::{AppError, AppResult};
use crate::models::{Channel, Recipient};

/// Rendering capability over named templates.
///
/// Lookup misses must surface as [`AppError::TemplateNotFound`] so callers
/// can fall back to an alternate template suffix.
pub trait TemplateEngine: Send + Sync {
    fn render(&self, path: &str, context: &Map<String, JsonValue>) -> AppResult<String>;
}

/// Template file path for a channel body, `{template}/{suffix}`.
pub fn template_path(template: &str, suffix: &str) -> String {
    format!("{}/{}", template, suffix)
}

/// Primary template suffix per channel.
pub fn primary_suffix(channel: Channel) -> &'static str {
    match channel {
        Channel::Email => "email.txt",
        Channel::Sms => "sms.txt",
        Channel::Push => "push.json",
        Channel::Whatsapp => "whatsapp.txt",
        Channel::Telegram => "telegram.txt",
    }
}

/// Alternate suffix tried when the primary template is absent.
/// Only the conversational text channels degrade to the sms template.
pub fn fallback_suffix(channel: Channel) -> Option<&'static str> {
    match channel {
        Channel::Whatsapp | Channel::Telegram => Some("sms.txt"),
        _ => None,
    }
}

/// Renders the channel body for a template, applying the per-channel
/// fallback convention.
pub fn render_channel_body(
    engine: &dyn TemplateEngine,
    channel: Channel,
    template: &str,
    context: &Map<String, JsonValue>,
) -> AppResult<String> {
    let primary = template_path(template, primary_suffix(channel));
    match engine.render(&primary, context) {
        Err(AppError::TemplateNotFound { .. }) => match fallback_suffix(channel) {
            Some(suffix) => engine.render(&template_path(template, suffix), context),
            None => Err(AppError::TemplateNotFound { name: primary }),
        },
        other => other,
    }
}

/// Builds the render context for one receiver: the request context plus
/// injected `user` and `subject` entries.
pub fn receiver_context(
    base: &Map<String, JsonValue>,
    user: &Recipient,
    subject: &str,
) -> Map<String, JsonValue> {
    let mut ctx = base.clone();
    ctx.insert(
        "user".to_string(),
        serde_json::to_value(user).unwrap_or(JsonValue::Null),
    );
    ctx.entry("subject".to_string())
        .or_insert_with(|| JsonValue::String(subject.to_string()));
    ctx
}
