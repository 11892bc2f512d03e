use async_trait::async_trait;
use uuid::Uuid;

use crate::database::Database;
use crate::models::task::{NewTask, Task, TaskStatus, UpdateTaskRequest};
use crate::repositories::TaskStore;
use crate::utils::errors::ServiceError;

const TASK_COLUMNS: &str = "id, title, description, assigned_to, assigned_by, due_date, \
     progress, status, warning_sent, created_at, updated_at";

#[async_trait]
impl TaskStore for Database {
    async fn list_pending(&self) -> Result<Vec<Task>, ServiceError> {
        sqlx::query_as::<_, Task>(&format!(
            "SELECT {} FROM tasks WHERE status = $1",
            TASK_COLUMNS
        ))
        .bind(TaskStatus::Pending.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            log::error!("Database error listing pending tasks: {}", e);
            ServiceError::DatabaseError("Failed to list pending tasks".to_string())
        })
    }

    async fn mark_warning_sent(&self, task_id: Uuid) -> Result<bool, ServiceError> {
        let result = sqlx::query(
            "UPDATE tasks SET warning_sent = TRUE, updated_at = NOW()
             WHERE id = $1 AND warning_sent = FALSE"
        )
        .bind(task_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            log::error!("Database error flagging task {}: {}", task_id, e);
            ServiceError::DatabaseError("Failed to flag task warning".to_string())
        })?;

        Ok(result.rows_affected() == 1)
    }
}

impl Database {
    pub async fn create_task(&self, new_task: &NewTask) -> Result<Task, ServiceError> {
        sqlx::query_as::<_, Task>(&format!(
            "INSERT INTO tasks (title, description, assigned_to, assigned_by, due_date)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {}",
            TASK_COLUMNS
        ))
        .bind(&new_task.title)
        .bind(&new_task.description)
        .bind(new_task.assigned_to)
        .bind(new_task.assigned_by)
        .bind(&new_task.due_date)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            log::error!("Database error creating task: {}", e);
            ServiceError::DatabaseError("Failed to create task".to_string())
        })
    }

    pub async fn find_task(&self, task_id: Uuid) -> Result<Option<Task>, ServiceError> {
        sqlx::query_as::<_, Task>(&format!("SELECT {} FROM tasks WHERE id = $1", TASK_COLUMNS))
            .bind(task_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                log::error!("Database error fetching task: {}", e);
                ServiceError::DatabaseError("Failed to fetch task".to_string())
            })
    }

    pub async fn list_tasks_assigned_to(&self, user_id: Uuid) -> Result<Vec<Task>, ServiceError> {
        self.list_tasks_where("assigned_to", user_id).await
    }

    pub async fn list_tasks_assigned_by(&self, manager_id: Uuid) -> Result<Vec<Task>, ServiceError> {
        self.list_tasks_where("assigned_by", manager_id).await
    }

    async fn list_tasks_where(&self, column: &'static str, user_id: Uuid) -> Result<Vec<Task>, ServiceError> {
        sqlx::query_as::<_, Task>(&format!(
            "SELECT {} FROM tasks WHERE {} = $1 ORDER BY created_at DESC",
            TASK_COLUMNS, column
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            log::error!("Database error fetching tasks by {}: {}", column, e);
            ServiceError::DatabaseError("Failed to fetch tasks".to_string())
        })
    }

    /// Applies a manager edit. `warning_sent` is never touched here.
    pub async fn update_task(
        &self,
        task_id: Uuid,
        changes: &UpdateTaskRequest,
    ) -> Result<Task, ServiceError> {
        let mut query_builder = sqlx::QueryBuilder::new("UPDATE tasks SET updated_at = NOW()");

        if let Some(ref title) = changes.title {
            query_builder.push(", title = ").push_bind(title);
        }
        if let Some(ref description) = changes.description {
            query_builder.push(", description = ").push_bind(description);
        }
        if let Some(assigned_to) = changes.assigned_to {
            query_builder.push(", assigned_to = ").push_bind(assigned_to);
        }
        if let Some(ref due_date) = changes.due_date {
            query_builder.push(", due_date = ").push_bind(due_date);
        }
        if let Some(progress) = changes.progress {
            query_builder.push(", progress = ").push_bind(progress);
        }
        if let Some(status) = changes.status {
            query_builder.push(", status = ").push_bind(status.as_str());
        }

        query_builder.push(" WHERE id = ").push_bind(task_id);
        query_builder.push(" RETURNING ").push(TASK_COLUMNS);

        query_builder
            .build_query_as::<Task>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                log::error!("Database error updating task: {}", e);
                ServiceError::DatabaseError("Failed to update task".to_string())
            })?
            .ok_or_else(|| ServiceError::NotFound("Task not found".to_string()))
    }

    pub async fn update_progress(
        &self,
        task_id: Uuid,
        progress: i32,
        status: TaskStatus,
    ) -> Result<Task, ServiceError> {
        sqlx::query_as::<_, Task>(&format!(
            "UPDATE tasks SET progress = $1, status = $2, updated_at = NOW()
             WHERE id = $3
             RETURNING {}",
            TASK_COLUMNS
        ))
        .bind(progress)
        .bind(status.as_str())
        .bind(task_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            log::error!("Database error updating progress: {}", e);
            ServiceError::DatabaseError("Failed to update progress".to_string())
        })?
        .ok_or_else(|| ServiceError::NotFound("Task not found".to_string()))
    }
}
