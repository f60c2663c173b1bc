//! Email dispatch with gateway fallback.
//!
//! When a transport send fails, the whole receiver set is retried against
//! the next gateway in the configured fallback chain, so receivers already
//! served by the failing gateway may be emailed more than once. The chain
//! stops at the first gateway that completes a clean pass.

use tracing::{debug, warn};

use crate::clients::email::{EmailClient, EmailMessage};
use crate::error::{AppError, AppResult};
use crate::gateway::GatewayRegistry;
use crate::models::{Channel, ChannelReport, DeliveryFailure, NotifyRequest, Recipient};
use crate::render::{receiver_context, template_path, TemplateEngine};

const HTML_SUFFIX: &str = "email.html";

/// Text body plus the optional html alternative for one receiver.
fn email_bodies(
    templates: &dyn TemplateEngine,
    request: &NotifyRequest,
    receiver: &Recipient,
) -> AppResult<(String, Option<String>)> {
    if let Some(message) = &request.final_message {
        return Ok((message.clone(), None));
    }
    let template = request
        .template
        .as_deref()
        .ok_or_else(|| AppError::validation("template", "no template and no final_message"))?;
    let context = receiver_context(&request.context, receiver, &request.subject);

    let text = templates.render(
        &template_path(template, crate::render::primary_suffix(Channel::Email)),
        &context,
    )?;
    let html = match templates.render(&template_path(template, HTML_SUFFIX), &context) {
        Ok(html) => Some(html),
        Err(AppError::TemplateNotFound { .. }) => None,
        Err(other) => return Err(other),
    };
    Ok((text, html))
}

/// One full pass over the receiver set through a single gateway. The flag
/// is true when at least one transport send failed; render failures do not
/// raise it, since another gateway would fail them identically.
async fn run_pass(
    client: &dyn EmailClient,
    gateway: &str,
    templates: &dyn TemplateEngine,
    request: &NotifyRequest,
    receivers: &[Recipient],
) -> (ChannelReport, bool) {
    let mut report = ChannelReport::new(gateway);
    let mut transport_failed = false;

    for receiver in receivers {
        let Some(address) = receiver.email.as_deref() else {
            warn!(user = %receiver.username, "receiver has no email address, skipping");
            report.skipped += 1;
            continue;
        };
        report.attempted += 1;

        let (text_body, html_body) = match email_bodies(templates, request, receiver) {
            Ok(bodies) => bodies,
            Err(err) => {
                report.failures.push(DeliveryFailure {
                    recipient: receiver.username.clone(),
                    error: err.to_string(),
                });
                continue;
            }
        };

        let message = EmailMessage {
            to: address.to_string(),
            subject: request.subject.clone(),
            text_body,
            html_body,
        };
        match client.send(&message).await {
            Ok(_) => {
                debug!(gateway = %gateway, to = %address, "email delivered");
                report.delivered += 1;
            }
            Err(err) => {
                warn!(gateway = %gateway, to = %address, error = %err, "email send failed");
                transport_failed = true;
                report.failures.push(DeliveryFailure {
                    recipient: receiver.username.clone(),
                    error: err.to_string(),
                });
            }
        }
    }

    (report, transport_failed)
}

pub(crate) async fn send_emails(
    registry: &GatewayRegistry,
    templates: &dyn TemplateEngine,
    request: &NotifyRequest,
    receivers: &[Recipient],
) -> AppResult<ChannelReport> {
    let override_gateway = request
        .gateway_overrides
        .get(&Channel::Email)
        .map(String::as_str);
    let resolved = registry.email(override_gateway)?;

    let (mut report, mut transport_failed) = run_pass(
        resolved.client.as_ref(),
        &resolved.gateway,
        templates,
        request,
        receivers,
    )
    .await;

    let mut tried_gateways: Vec<String> = Vec::new();
    if transport_failed {
        for fallback in registry.email_fallbacks() {
            // A gateway is attempted at most once, even when the chain
            // lists the default or repeats a name.
            if *fallback == report.gateway || tried_gateways.contains(fallback) {
                continue;
            }
            warn!(
                failed = %report.gateway,
                fallback = %fallback,
                "email gateway failed, retrying receivers through fallback"
            );
            tried_gateways.push(report.gateway.clone());

            let next = registry.email(Some(fallback))?;
            let (next_report, next_failed) = run_pass(
                next.client.as_ref(),
                &next.gateway,
                templates,
                request,
                receivers,
            )
            .await;
            report = next_report;
            transport_failed = next_failed;
            if !transport_failed {
                break;
            }
        }
    }
    report.tried_gateways = tried_gateways;

    Ok(report)
}
