//! Telegram dispatch.
//!
//! Bodies come from the telegram template when present, falling back to
//! the sms template otherwise. Receivers without a chat id are skipped.

use tracing::{debug, warn};

use crate::dispatch::message_body;
use crate::error::AppResult;
use crate::gateway::GatewayRegistry;
use crate::models::{Channel, ChannelReport, DeliveryFailure, NotifyRequest, Recipient};
use crate::render::TemplateEngine;

pub(crate) async fn send_telegrams(
    registry: &GatewayRegistry,
    templates: &dyn TemplateEngine,
    request: &NotifyRequest,
    receivers: &[Recipient],
) -> AppResult<ChannelReport> {
    let override_gateway = request
        .gateway_overrides
        .get(&Channel::Telegram)
        .map(String::as_str);
    let resolved = registry.telegram(override_gateway)?;
    let mut report = ChannelReport::new(&resolved.gateway);

    for receiver in receivers {
        let Some(chat_id) = receiver.telegram_chat_id else {
            warn!(user = %receiver.username, "receiver has no telegram chat id, skipping");
            report.skipped += 1;
            continue;
        };
        report.attempted += 1;

        let body = match message_body(templates, Channel::Telegram, request, receiver) {
            Ok(body) => body,
            Err(err) => {
                report.failures.push(DeliveryFailure {
                    recipient: receiver.username.clone(),
                    error: err.to_string(),
                });
                continue;
            }
        };

        match resolved.client.send(chat_id, &body).await {
            Ok(_) => {
                debug!(gateway = %resolved.gateway, chat_id = chat_id, "telegram delivered");
                report.delivered += 1;
            }
            Err(err) => {
                warn!(gateway = %resolved.gateway, chat_id = chat_id, error = %err, "telegram send failed");
                report.failures.push(DeliveryFailure {
                    recipient: receiver.username.clone(),
                    error: err.to_string(),
                });
            }
        }
    }

    Ok(report)
}
