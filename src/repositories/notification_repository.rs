use async_trait::async_trait;
use uuid::Uuid;

use crate::database::Database;
use crate::models::notification::{MessageType, Notification};
use crate::repositories::NotificationStore;
use crate::utils::errors::ServiceError;

#[async_trait]
impl NotificationStore for Database {
    async fn insert(
        &self,
        recipient_id: Uuid,
        content: &str,
        message_type: MessageType,
    ) -> Result<Notification, ServiceError> {
        sqlx::query_as::<_, Notification>(
            "INSERT INTO messages (recipient_id, content, message_type)
             VALUES ($1, $2, $3)
             RETURNING id, recipient_id, content, message_type, created_at"
        )
        .bind(recipient_id)
        .bind(content)
        .bind(message_type.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            log::error!("Database error inserting message for {}: {}", recipient_id, e);
            ServiceError::DatabaseError("Failed to store notification".to_string())
        })
    }

    async fn list_for_recipient(&self, recipient_id: Uuid) -> Result<Vec<Notification>, ServiceError> {
        sqlx::query_as::<_, Notification>(
            "SELECT id, recipient_id, content, message_type, created_at
             FROM messages WHERE recipient_id = $1
             ORDER BY created_at DESC"
        )
        .bind(recipient_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            log::error!("Database error fetching messages: {}", e);
            ServiceError::DatabaseError("Failed to fetch notifications".to_string())
        })
    }
}
