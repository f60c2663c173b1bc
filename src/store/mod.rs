//! Notification persistence capability.
//!
//! The durable engine behind notification records is an external
//! collaborator; this module defines the seam and ships an in-memory
//! implementation used by tests and the CLI. Writes are single-record and
//! independent, so no coordination beyond the map's own sharding is needed.

use async_trait::async_trait;
use dashmap::DashMap;
use jiff::Timestamp;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::Notification;

/// Store capability for persisted notification records.
///
/// Records are never hard-deleted; there is deliberately no delete
/// operation.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Persists a new record.
    async fn create(&self, notification: Notification) -> AppResult<Notification>;

    /// Fetches a record by id.
    async fn get(&self, id: Uuid) -> AppResult<Option<Notification>>;

    /// Stamps the read timestamp on a record.
    async fn mark_read(&self, id: Uuid) -> AppResult<()>;

    /// Lists the records addressed to a user, unordered.
    async fn list_for_user(&self, username: &str) -> AppResult<Vec<Notification>>;
}

/// In-memory notification store backed by a concurrent map.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: DashMap<Uuid, Notification>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn create(&self, notification: Notification) -> AppResult<Notification> {
        self.records.insert(notification.id, notification.clone());
        Ok(notification)
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<Notification>> {
        Ok(self.records.get(&id).map(|entry| entry.clone()))
    }

    async fn mark_read(&self, id: Uuid) -> AppResult<()> {
        match self.records.get_mut(&id) {
            Some(mut entry) => {
                entry.read = Some(Timestamp::now());
                Ok(())
            }
            None => Err(AppError::Store {
                operation: format!("mark_read({})", id),
                source: anyhow::anyhow!("no such notification"),
            }),
        }
    }

    async fn list_for_user(&self, username: &str) -> AppResult<Vec<Notification>> {
        Ok(self
            .records
            .iter()
            .filter(|entry| entry.user.as_deref() == Some(username))
            .map(|entry| entry.clone())
            .collect())
    }
}
