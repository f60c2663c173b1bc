//! Dispatch request and per-channel report types.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::directory::SymbolicGroup;
use crate::models::{Channel, Notification, Recipient};

/// Receivers of a dispatch: an explicit list, or a symbolic group expanded
/// through the user directory before any per-channel dispatch.
#[derive(Debug, Clone)]
pub enum Audience {
    Explicit(Vec<Recipient>),
    Group(SymbolicGroup),
}

impl From<Vec<Recipient>> for Audience {
    fn from(receivers: Vec<Recipient>) -> Self {
        Audience::Explicit(receivers)
    }
}

impl From<SymbolicGroup> for Audience {
    fn from(group: SymbolicGroup) -> Self {
        Audience::Group(group)
    }
}

/// A logical notification to fan out across channels.
///
/// Exactly one of `template` and `final_message` must be set; the notifier
/// validates this before any dispatch.
#[derive(Debug, Clone)]
pub struct NotifyRequest {
    pub channels: Vec<Channel>,
    pub subject: String,
    pub receivers: Audience,
    pub template: Option<String>,
    pub context: Map<String, JsonValue>,
    pub final_message: Option<String>,
    /// Per-channel gateway overrides; absent channels use the configured
    /// default gateway.
    pub gateway_overrides: HashMap<Channel, String>,
    /// Fields stripped from push payloads before transmission
    pub remove_notification_fields: Vec<String>,
    /// None defers to the configured default
    pub threaded: Option<bool>,
}

impl NotifyRequest {
    pub fn new(channels: Vec<Channel>, subject: impl Into<String>) -> Self {
        Self {
            channels,
            subject: subject.into(),
            receivers: Audience::Explicit(Vec::new()),
            template: None,
            context: Map::new(),
            final_message: None,
            gateway_overrides: HashMap::new(),
            remove_notification_fields: Vec::new(),
            threaded: None,
        }
    }

    pub fn to(mut self, receivers: impl Into<Audience>) -> Self {
        self.receivers = receivers.into();
        self
    }

    pub fn template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    pub fn context(mut self, context: Map<String, JsonValue>) -> Self {
        self.context = context;
        self
    }

    pub fn final_message(mut self, message: impl Into<String>) -> Self {
        self.final_message = Some(message.into());
        self
    }

    pub fn gateway(mut self, channel: Channel, gateway: impl Into<String>) -> Self {
        self.gateway_overrides.insert(channel, gateway.into());
        self
    }

    pub fn remove_notification_fields(mut self, fields: Vec<String>) -> Self {
        self.remove_notification_fields = fields;
        self
    }

    pub fn threaded(mut self, threaded: bool) -> Self {
        self.threaded = Some(threaded);
        self
    }
}

/// One recipient the channel could not deliver to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryFailure {
    pub recipient: String,
    pub error: String,
}

/// Outcome of one channel's dispatch.
///
/// Send failures are recorded here instead of propagating, so a caller can
/// observe partial failure without one channel aborting its siblings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChannelReport {
    /// Gateway that served the (final) attempt
    pub gateway: String,
    /// Gateways tried before the final one, in order (email fallback chain)
    pub tried_gateways: Vec<String>,
    pub attempted: usize,
    pub delivered: usize,
    /// Receivers skipped for a missing contact address
    pub skipped: usize,
    pub failures: Vec<DeliveryFailure>,
    /// Records created during push dispatch
    #[serde(skip)]
    pub notifications: Vec<Notification>,
}

impl ChannelReport {
    pub fn new(gateway: impl Into<String>) -> Self {
        Self {
            gateway: gateway.into(),
            ..Self::default()
        }
    }

    /// True when every attempted receiver was delivered to.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && self.skipped == 0
    }
}
