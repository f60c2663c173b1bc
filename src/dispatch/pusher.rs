//! Push dispatch.
//!
//! Push is the one channel that persists: each receiver gets a
//! notification record built from the rendered `push.json` template and
//! saved through the store before the provider is called. The created
//! records ride along on the channel report.

use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};
use tracing::{debug, warn};

use crate::error::{AppError, AppResult};
use crate::gateway::GatewayRegistry;
use crate::models::{
    Action, Channel, ChannelReport, DeliveryFailure, Mode, Notification, NotificationBuilder,
    NotifyRequest, Recipient,
};
use crate::render::{receiver_context, render_channel_body, TemplateEngine};
use crate::store::NotificationStore;

/// Shape of a rendered `push.json` template.
#[derive(Debug, Default, Deserialize)]
struct PushFields {
    subject: Option<String>,
    #[serde(default)]
    text: String,
    #[serde(rename = "type", default)]
    kind: String,
    sub_type: Option<String>,
    link: Option<String>,
    image: Option<String>,
    mode: Option<Mode>,
    #[serde(default)]
    data: Map<String, JsonValue>,
    #[serde(default)]
    actions: Vec<Action>,
}

fn push_fields(
    templates: &dyn TemplateEngine,
    request: &NotifyRequest,
    receiver: &Recipient,
) -> AppResult<PushFields> {
    if let Some(message) = &request.final_message {
        return Ok(PushFields {
            text: message.clone(),
            ..PushFields::default()
        });
    }
    let template = request
        .template
        .as_deref()
        .ok_or_else(|| AppError::validation("template", "no template and no final_message"))?;
    let context = receiver_context(&request.context, receiver, &request.subject);
    let rendered = render_channel_body(templates, Channel::Push, template, &context)?;
    serde_json::from_str(&rendered).map_err(|e| AppError::Template {
        name: format!("{}/push.json", template),
        reason: format!("rendered template is not a valid push payload: {}", e),
    })
}

async fn build_notification(
    store: &dyn NotificationStore,
    request: &NotifyRequest,
    receiver: &Recipient,
    fields: PushFields,
) -> AppResult<Notification> {
    let mut builder = NotificationBuilder::new(fields.subject.unwrap_or_else(|| request.subject.clone()))
        .text(fields.text)
        .user(&receiver.username)
        .kind(fields.kind, fields.sub_type)
        .mode(fields.mode.unwrap_or_default())
        .actions(fields.actions)
        .data(JsonValue::Object(fields.data))?;
    if let Some(link) = fields.link {
        builder = builder.link(link);
    }
    if let Some(image) = fields.image {
        builder = builder.image(image);
    }
    builder.save(store).await
}

pub(crate) async fn send_pushes(
    registry: &GatewayRegistry,
    templates: &dyn TemplateEngine,
    store: &dyn NotificationStore,
    request: &NotifyRequest,
    receivers: &[Recipient],
) -> AppResult<ChannelReport> {
    let override_gateway = request
        .gateway_overrides
        .get(&Channel::Push)
        .map(String::as_str);
    let resolved = registry.push(override_gateway)?;
    let mut report = ChannelReport::new(&resolved.gateway);

    for receiver in receivers {
        report.attempted += 1;

        let fields = match push_fields(templates, request, receiver) {
            Ok(fields) => fields,
            Err(err) => {
                report.failures.push(DeliveryFailure {
                    recipient: receiver.username.clone(),
                    error: err.to_string(),
                });
                continue;
            }
        };

        // The record is persisted even when the provider call fails, so a
        // user still sees the notification in-app.
        let notification = match build_notification(store, request, receiver, fields).await {
            Ok(notification) => notification,
            Err(err) => {
                warn!(user = %receiver.username, error = %err, "failed to persist push notification");
                report.failures.push(DeliveryFailure {
                    recipient: receiver.username.clone(),
                    error: err.to_string(),
                });
                continue;
            }
        };
        report.notifications.push(notification.clone());

        match resolved
            .client
            .send(receiver, &notification, &request.remove_notification_fields)
            .await
        {
            Ok(_) => {
                debug!(gateway = %resolved.gateway, user = %receiver.username, "push delivered");
                report.delivered += 1;
            }
            Err(err) => {
                warn!(gateway = %resolved.gateway, user = %receiver.username, error = %err, "push send failed");
                report.failures.push(DeliveryFailure {
                    recipient: receiver.username.clone(),
                    error: err.to_string(),
                });
            }
        }
    }

    Ok(report)
}
