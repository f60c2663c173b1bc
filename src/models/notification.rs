//! Persisted notification record and its builder.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::store::NotificationStore;

/// Display mode of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    User,
    Admin,
}

impl Default for Mode {
    fn default() -> Self {
        Mode::User
    }
}

/// An actionable element attached to a notification (a button the client
/// renders).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub text: String,
    pub method: String,
    pub url: String,
    #[serde(default)]
    pub fields: Map<String, JsonValue>,
}

/// A persisted notification record.
///
/// Created on push dispatch, mutated by read-state updates, never
/// hard-deleted (the store exposes no delete operation).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    /// Username of the receiving user, if any
    pub user: Option<String>,
    pub subject: String,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub sub_type: Option<String>,
    pub link: Option<String>,
    pub image: Option<String>,
    pub mode: Mode,
    pub data: JsonValue,
    pub actions: Vec<Action>,
    pub read: Option<Timestamp>,
    pub sent: Timestamp,
    pub expiry: Option<Timestamp>,
    pub public: bool,
    pub encrypted: bool,
}

impl Notification {
    /// Serializes the record to a JSON object with the given fields removed,
    /// the payload shape handed to push clients.
    pub fn to_redacted_json(&self, remove_fields: &[String]) -> JsonValue {
        let mut value = serde_json::to_value(self).unwrap_or(JsonValue::Null);
        if let JsonValue::Object(ref mut map) = value {
            for field in remove_fields {
                map.remove(field);
            }
        }
        value
    }
}

/// Fluent builder for [`Notification`] records.
///
/// Terminates with [`NotificationBuilder::save`], which stamps the sent
/// timestamp and persists through the store capability.
#[derive(Debug, Clone, Default)]
pub struct NotificationBuilder {
    text: String,
    user: Option<String>,
    subject: String,
    kind: String,
    sub_type: Option<String>,
    mode: Mode,
    actions: Vec<Action>,
    link: Option<String>,
    data: JsonValue,
    image: Option<String>,
    expiry: Option<Timestamp>,
    public: bool,
    encrypted: bool,
}

impl NotificationBuilder {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            data: JsonValue::Object(Map::new()),
            ..Self::default()
        }
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn user(mut self, username: impl Into<String>) -> Self {
        self.user = Some(username.into());
        self
    }

    pub fn kind(mut self, kind: impl Into<String>, sub_type: Option<String>) -> Self {
        self.kind = kind.into();
        self.sub_type = sub_type;
        self
    }

    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    pub fn image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    pub fn actions(mut self, actions: Vec<Action>) -> Self {
        self.actions.extend(actions);
        self
    }

    /// Merges the given object into the data map.
    pub fn data(mut self, data: JsonValue) -> AppResult<Self> {
        match (&mut self.data, data) {
            (JsonValue::Object(existing), JsonValue::Object(incoming)) => {
                existing.extend(incoming);
                Ok(self)
            }
            _ => Err(AppError::validation("data", "data should be a JSON object")),
        }
    }

    pub fn expiry(mut self, expiry: Timestamp) -> Self {
        self.expiry = Some(expiry);
        self
    }

    pub fn public(mut self, public: bool) -> Self {
        self.public = public;
        self
    }

    pub fn encrypted(mut self, encrypted: bool) -> Self {
        self.encrypted = encrypted;
        self
    }

    /// Stamps and persists the record.
    pub async fn save(self, store: &dyn NotificationStore) -> AppResult<Notification> {
        let notification = Notification {
            id: Uuid::new_v4(),
            user: self.user,
            subject: self.subject,
            text: self.text,
            kind: self.kind,
            sub_type: self.sub_type,
            link: self.link,
            image: self.image,
            mode: self.mode,
            data: self.data,
            actions: self.actions,
            read: None,
            sent: Timestamp::now(),
            expiry: self.expiry,
            public: self.public,
            encrypted: self.encrypted,
        };
        store.create(notification).await
    }
}
