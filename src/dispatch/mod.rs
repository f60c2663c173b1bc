//! Per-channel dispatchers and the notifier facade.
//!
//! Each dispatcher owns one channel's delivery loop: resolve the gateway,
//! render a body per receiver, send, and record the outcome in a
//! [`ChannelReport`](crate::models::ChannelReport). Delivery problems never
//! escape a dispatcher; only setup problems (unknown gateway, unconfigured
//! channel) surface as errors.

mod emailer;
mod notifier;
mod pusher;
mod smser;
mod telegramer;
mod whatsapper;

pub use notifier::{ChannelDispatch, Dispatch, Notifier, NotifyOutcome};

pub(crate) use emailer::send_emails;
pub(crate) use pusher::send_pushes;
pub(crate) use smser::send_sms;
pub(crate) use telegramer::send_telegrams;
pub(crate) use whatsapper::send_whatsapps;

use crate::error::{AppError, AppResult};
use crate::models::{Channel, NotifyRequest, Recipient};
use crate::render::{receiver_context, render_channel_body, TemplateEngine};

/// Body of a plain-text channel message for one receiver: the final
/// message verbatim, or the rendered channel template.
pub(crate) fn message_body(
    templates: &dyn TemplateEngine,
    channel: Channel,
    request: &NotifyRequest,
    receiver: &Recipient,
) -> AppResult<String> {
    if let Some(message) = &request.final_message {
        return Ok(message.clone());
    }
    let template = request
        .template
        .as_deref()
        .ok_or_else(|| AppError::validation("template", "no template and no final_message"))?;
    let context = receiver_context(&request.context, receiver, &request.subject);
    render_channel_body(templates, channel, template, &context)
}
