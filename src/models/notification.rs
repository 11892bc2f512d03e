use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use chrono::{DateTime, Utc};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Warning,
    Completion,
    NewTask,
    TaskEdited,
    Info,
}

#[derive(Debug, Error)]
#[error("unknown message type: {0}")]
pub struct UnknownMessageType(pub String);

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Warning => "warning",
            MessageType::Completion => "completion",
            MessageType::NewTask => "new_task",
            MessageType::TaskEdited => "task_edited",
            MessageType::Info => "info",
        }
    }
}

impl TryFrom<String> for MessageType {
    type Error = UnknownMessageType;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "warning" => Ok(MessageType::Warning),
            "completion" => Ok(MessageType::Completion),
            "new_task" => Ok(MessageType::NewTask),
            "task_edited" => Ok(MessageType::TaskEdited),
            "info" => Ok(MessageType::Info),
            _ => Err(UnknownMessageType(value)),
        }
    }
}

/// A row of the `messages` table. Never mutated once written.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, ToSchema)]
pub struct Notification {
    pub id: Uuid,
    pub recipient_id: Uuid,
    pub content: String,
    #[sqlx(try_from = "String")]
    pub message_type: MessageType,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NotificationQuery {
    /// Most recent N notifications
    pub limit: Option<usize>,
}
