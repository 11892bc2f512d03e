use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Utc};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::utils::time::{format_due, hours_until, parse_due, to_ist_timestamp};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
}

#[derive(Debug, Error)]
#[error("unknown task status: {0}")]
pub struct UnknownStatus(pub String);

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
        }
    }

    /// Status after an employee reports progress.
    pub fn from_progress(progress: i32) -> Self {
        if progress >= 100 {
            TaskStatus::Completed
        } else {
            TaskStatus::Pending
        }
    }
}

impl TryFrom<String> for TaskStatus {
    type Error = UnknownStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "pending" => Ok(TaskStatus::Pending),
            "in_progress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            _ => Err(UnknownStatus(value)),
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, ToSchema)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub assigned_to: Uuid,
    pub assigned_by: Uuid,
    /// ISO-8601 with an explicit offset. Kept as text so a malformed value
    /// degrades to "no deadline" instead of failing the whole row.
    pub due_date: Option<String>,
    pub progress: i32,
    #[sqlx(try_from = "String")]
    pub status: TaskStatus,
    pub warning_sent: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn due(&self) -> Option<DateTime<FixedOffset>> {
        parse_due(self.due_date.as_deref())
    }

    pub fn is_participant(&self, user_id: Uuid) -> bool {
        self.assigned_to == user_id || self.assigned_by == user_id
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TaskResponse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub assigned_to: Uuid,
    pub assigned_by: Uuid,
    pub due_date: Option<String>,
    pub due_display: String,
    pub hours_until_due: Option<f64>,
    pub progress: i32,
    pub status: TaskStatus,
    pub warning_sent: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaskResponse {
    pub fn from_task(task: Task, now: DateTime<FixedOffset>) -> Self {
        let hours_until_due = task.due().map(|due| hours_until(due, now));

        TaskResponse {
            id: task.id,
            due_display: format_due(task.due_date.as_deref()),
            hours_until_due,
            title: task.title,
            description: task.description,
            assigned_to: task.assigned_to,
            assigned_by: task.assigned_by,
            due_date: task.due_date,
            progress: task.progress,
            status: task.status,
            warning_sent: task.warning_sent,
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, max = 200, message = "Task title is required"))]
    pub title: String,
    pub description: Option<String>,
    pub assigned_to: Uuid,
    /// Full ISO-8601 due date. Takes precedence over `due_on`/`due_at`.
    pub due_date: Option<String>,
    pub due_on: Option<NaiveDate>,
    /// Wall-clock time at +05:30; defaults to 17:00 when only `due_on` is given.
    pub due_at: Option<NaiveTime>,
}

impl CreateTaskRequest {
    pub fn resolved_due_date(&self) -> Option<String> {
        if let Some(ref due) = self.due_date {
            return Some(due.clone());
        }
        let date = self.due_on?;
        let time = self.due_at.unwrap_or(default_due_time());
        to_ist_timestamp(date, time)
    }
}

pub fn default_due_time() -> NaiveTime {
    NaiveTime::from_hms_opt(17, 0, 0).unwrap_or(NaiveTime::MIN)
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateTaskRequest {
    #[validate(length(min = 1, max = 200, message = "Task title cannot be empty"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub assigned_to: Option<Uuid>,
    pub due_date: Option<String>,
    #[validate(range(min = 0, max = 100, message = "Progress must be between 0 and 100"))]
    pub progress: Option<i32>,
    pub status: Option<TaskStatus>,
}

impl UpdateTaskRequest {
    pub fn has_changes(&self) -> bool {
        self.title.is_some()
            || self.description.is_some()
            || self.assigned_to.is_some()
            || self.due_date.is_some()
            || self.progress.is_some()
            || self.status.is_some()
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ProgressUpdateRequest {
    #[validate(range(min = 0, max = 100, message = "Progress must be between 0 and 100"))]
    pub progress: i32,
}

/// Fields a new task row is inserted with.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub assigned_to: Uuid,
    pub assigned_by: Uuid,
    pub due_date: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_drives_status() {
        assert_eq!(TaskStatus::from_progress(0), TaskStatus::Pending);
        assert_eq!(TaskStatus::from_progress(99), TaskStatus::Pending);
        assert_eq!(TaskStatus::from_progress(100), TaskStatus::Completed);
    }

    #[test]
    fn status_text_round_trip() {
        for status in [TaskStatus::Pending, TaskStatus::InProgress, TaskStatus::Completed] {
            assert_eq!(TaskStatus::try_from(status.as_str().to_string()).unwrap(), status);
        }
        assert!(TaskStatus::try_from("done".to_string()).is_err());
    }

    #[test]
    fn due_date_from_date_and_time_parts() {
        let req = CreateTaskRequest {
            title: "Quarterly report".to_string(),
            description: None,
            assigned_to: Uuid::new_v4(),
            due_date: None,
            due_on: NaiveDate::from_ymd_opt(2026, 1, 20),
            due_at: None,
        };
        assert_eq!(
            req.resolved_due_date().as_deref(),
            Some("2026-01-20T17:00:00+05:30")
        );
    }

    #[test]
    fn explicit_due_date_wins() {
        let req = CreateTaskRequest {
            title: "Audit".to_string(),
            description: None,
            assigned_to: Uuid::new_v4(),
            due_date: Some("2026-02-01T10:00:00+05:30".to_string()),
            due_on: NaiveDate::from_ymd_opt(2026, 1, 20),
            due_at: None,
        };
        assert_eq!(
            req.resolved_due_date().as_deref(),
            Some("2026-02-01T10:00:00+05:30")
        );
    }

    #[test]
    fn progress_request_is_range_checked() {
        assert!(ProgressUpdateRequest { progress: 101 }.validate().is_err());
        assert!(ProgressUpdateRequest { progress: -1 }.validate().is_err());
        assert!(ProgressUpdateRequest { progress: 100 }.validate().is_ok());
    }
}
