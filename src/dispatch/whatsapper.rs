//! WhatsApp dispatch.
//!
//! Bodies come from the whatsapp template when present, falling back to
//! the sms template otherwise.

use tracing::{debug, warn};

use crate::dispatch::message_body;
use crate::error::AppResult;
use crate::gateway::GatewayRegistry;
use crate::models::{Channel, ChannelReport, DeliveryFailure, NotifyRequest, Recipient};
use crate::render::TemplateEngine;

pub(crate) async fn send_whatsapps(
    registry: &GatewayRegistry,
    templates: &dyn TemplateEngine,
    request: &NotifyRequest,
    receivers: &[Recipient],
) -> AppResult<ChannelReport> {
    let override_gateway = request
        .gateway_overrides
        .get(&Channel::Whatsapp)
        .map(String::as_str);
    let resolved = registry.whatsapp(override_gateway)?;
    let mut report = ChannelReport::new(&resolved.gateway);

    for receiver in receivers {
        let Some(number) = receiver.phone.as_deref() else {
            warn!(user = %receiver.username, "receiver has no phone number, skipping");
            report.skipped += 1;
            continue;
        };
        report.attempted += 1;

        let body = match message_body(templates, Channel::Whatsapp, request, receiver) {
            Ok(body) => body,
            Err(err) => {
                report.failures.push(DeliveryFailure {
                    recipient: receiver.username.clone(),
                    error: err.to_string(),
                });
                continue;
            }
        };

        match resolved.client.send(number, &body).await {
            Ok(_) => {
                debug!(gateway = %resolved.gateway, number = %number, "whatsapp delivered");
                report.delivered += 1;
            }
            Err(err) => {
                warn!(gateway = %resolved.gateway, number = %number, error = %err, "whatsapp send failed");
                report.failures.push(DeliveryFailure {
                    recipient: receiver.username.clone(),
                    error: err.to_string(),
                });
            }
        }
    }

    Ok(report)
}
