//! Persistence seams.
//!
//! The deadline sweep only sees these two traits, so it can run against
//! Postgres in production and an in-memory store in tests.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::notification::{MessageType, Notification};
use crate::models::task::Task;
use crate::utils::errors::ServiceError;

pub mod notification_repository;
pub mod task_repository;
pub mod user_repository;

#[cfg(test)]
pub mod memory;

#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Every task whose status is `pending`, in storage order.
    async fn list_pending(&self) -> Result<Vec<Task>, ServiceError>;

    /// Sets `warning_sent` only if it is still false. Returns whether this
    /// call performed the transition.
    async fn mark_warning_sent(&self, task_id: Uuid) -> Result<bool, ServiceError>;
}

#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn insert(
        &self,
        recipient_id: Uuid,
        content: &str,
        message_type: MessageType,
    ) -> Result<Notification, ServiceError>;

    /// Newest first.
    async fn list_for_recipient(&self, recipient_id: Uuid) -> Result<Vec<Notification>, ServiceError>;
}
