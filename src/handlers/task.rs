use actix_web::{web, HttpResponse, Result};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use uuid::Uuid;
use validator::Validate;

use crate::config::AppConfig;
use crate::database::Database;
use crate::handlers::current_user;
use crate::models::auth::{ApiResponse, Role};
use crate::models::notification::MessageType;
use crate::models::task::{
    CreateTaskRequest, NewTask, ProgressUpdateRequest, Task, TaskResponse, TaskStatus,
    UpdateTaskRequest,
};
use crate::services::notifier::{self, notify};
use crate::state::AppServices;
use crate::utils::errors::ServiceError;
use crate::utils::time::{current_instant, format_due, parse_due};

// A due date, when given, must be readable; "no deadline" is spelled by omitting it.
fn validate_due_date(due_date: Option<&str>) -> Result<(), ServiceError> {
    match due_date {
        Some(raw) if parse_due(Some(raw)).is_none() => Err(ServiceError::ValidationError(
            format!("Invalid due date '{}', expected ISO-8601", raw),
        )),
        _ => Ok(()),
    }
}

// Completion is announced once, on the transition into `completed`
fn became_completed(before: TaskStatus, after: TaskStatus) -> bool {
    after == TaskStatus::Completed && before != TaskStatus::Completed
}

async fn require_employee(db: &Database, user_id: Uuid) -> Result<(), ServiceError> {
    match db.find_user(user_id).await? {
        Some(user) if user.role == Role::Employee => Ok(()),
        Some(_) => Err(ServiceError::ValidationError(
            "Tasks can only be assigned to employees".to_string(),
        )),
        None => Err(ServiceError::ValidationError(format!("User {} not found", user_id))),
    }
}

async fn load_task(db: &Database, task_id: Uuid) -> Result<Task, ServiceError> {
    db.find_task(task_id).await?.ok_or_else(|| {
        log::warn!("Task not found: {}", task_id);
        ServiceError::NotFound("Task not found".to_string())
    })
}

/// Create and assign a new task
#[utoipa::path(
    post,
    path = "/api/tasks",
    tag = "tasks",
    security(
        ("bearer_auth" = [])
    ),
    request_body = CreateTaskRequest,
    responses(
        (status = 201, description = "Task created successfully", body = ApiResponse<TaskResponse>),
        (status = 400, description = "Validation error", body = crate::utils::errors::ServiceError),
        (status = 403, description = "Caller is not a manager", body = crate::utils::errors::ServiceError)
    )
)]
pub async fn create_task(
    auth: BearerAuth,
    db: web::Data<Database>,
    config: web::Data<AppConfig>,
    services: web::Data<AppServices>,
    task_req: web::Json<CreateTaskRequest>,
) -> Result<HttpResponse, ServiceError> {
    log::info!("POST /api/tasks - Creating new task: {}", task_req.title);

    let (manager_id, claims) = current_user(&auth, &config)?;
    claims.require_manager()?;

    task_req.validate()?;
    let due_date = task_req.resolved_due_date();
    validate_due_date(due_date.as_deref())?;
    require_employee(&db, task_req.assigned_to).await?;

    let task = db
        .create_task(&NewTask {
            title: task_req.title.trim().to_string(),
            description: task_req.description.clone(),
            assigned_to: task_req.assigned_to,
            assigned_by: manager_id,
            due_date,
        })
        .await?;

    let due_display = task.due_date.as_deref().map(|d| format_due(Some(d)));
    let message = notifier::new_task(&task.title, due_display.as_deref());
    notify(db.get_ref(), task.assigned_to, &message, MessageType::NewTask).await?;

    log::info!("Task created successfully with ID: {}", task.id);
    let now = current_instant(services.clock.as_ref());
    Ok(HttpResponse::Created().json(ApiResponse::success(
        "Task created successfully",
        TaskResponse::from_task(task, now),
    )))
}

/// List the caller's tasks: assigned to an employee, or assigned by a manager
#[utoipa::path(
    get,
    path = "/api/tasks",
    tag = "tasks",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Tasks retrieved successfully", body = ApiResponse<Vec<TaskResponse>>),
        (status = 401, description = "Unauthorized", body = crate::utils::errors::ServiceError)
    )
)]
pub async fn get_tasks(
    auth: BearerAuth,
    db: web::Data<Database>,
    config: web::Data<AppConfig>,
    services: web::Data<AppServices>,
) -> Result<HttpResponse, ServiceError> {
    log::info!("GET /api/tasks");

    let (user_id, claims) = current_user(&auth, &config)?;

    let tasks = match claims.role {
        Role::Manager => db.list_tasks_assigned_by(user_id).await?,
        Role::Employee => db.list_tasks_assigned_to(user_id).await?,
    };

    let now = current_instant(services.clock.as_ref());
    let tasks: Vec<TaskResponse> = tasks
        .into_iter()
        .map(|task| TaskResponse::from_task(task, now))
        .collect();

    log::info!("Retrieved {} tasks", tasks.len());
    Ok(HttpResponse::Ok().json(ApiResponse::success("Tasks retrieved successfully", tasks)))
}

/// Get a specific task by ID
#[utoipa::path(
    get,
    path = "/api/tasks/{id}",
    tag = "tasks",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = Uuid, Path, description = "Task ID")
    ),
    responses(
        (status = 200, description = "Task retrieved successfully", body = ApiResponse<TaskResponse>),
        (status = 404, description = "Task not found", body = crate::utils::errors::ServiceError)
    )
)]
pub async fn get_task(
    auth: BearerAuth,
    db: web::Data<Database>,
    config: web::Data<AppConfig>,
    services: web::Data<AppServices>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    let task_id = path.into_inner();
    log::info!("GET /api/tasks/{}", task_id);

    let (user_id, _) = current_user(&auth, &config)?;

    let task = load_task(&db, task_id).await?;
    if !task.is_participant(user_id) {
        // Same answer as a missing task.
        return Err(ServiceError::NotFound("Task not found".to_string()));
    }

    let now = current_instant(services.clock.as_ref());
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "Task retrieved successfully",
        TaskResponse::from_task(task, now),
    )))
}

/// Edit a task as its assigning manager
#[utoipa::path(
    put,
    path = "/api/tasks/{id}",
    tag = "tasks",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = Uuid, Path, description = "Task ID")
    ),
    request_body = UpdateTaskRequest,
    responses(
        (status = 200, description = "Task updated successfully", body = ApiResponse<TaskResponse>),
        (status = 403, description = "Caller did not assign this task", body = crate::utils::errors::ServiceError),
        (status = 404, description = "Task not found", body = crate::utils::errors::ServiceError)
    )
)]
pub async fn update_task(
    auth: BearerAuth,
    db: web::Data<Database>,
    config: web::Data<AppConfig>,
    services: web::Data<AppServices>,
    path: web::Path<Uuid>,
    update_req: web::Json<UpdateTaskRequest>,
) -> Result<HttpResponse, ServiceError> {
    let task_id = path.into_inner();
    log::info!("PUT /api/tasks/{}", task_id);

    let (user_id, claims) = current_user(&auth, &config)?;
    claims.require_manager()?;

    let existing = load_task(&db, task_id).await?;
    if existing.assigned_by != user_id {
        return Err(ServiceError::Forbidden("Only the assigning manager can edit this task".to_string()));
    }

    let mut changes = update_req.into_inner();
    changes.validate()?;
    validate_due_date(changes.due_date.as_deref())?;
    if let Some(assignee) = changes.assigned_to {
        require_employee(&db, assignee).await?;
    }
    if changes.status.is_none() {
        changes.status = changes.progress.map(TaskStatus::from_progress);
    }

    let existing_status = existing.status;
    let task = if changes.has_changes() {
        db.update_task(task_id, &changes).await?
    } else {
        existing
    };

    let message = notifier::task_edited(&task.title);
    notify(db.get_ref(), task.assigned_to, &message, MessageType::TaskEdited).await?;

    if became_completed(existing_status, task.status) {
        let assignee = db
            .find_user(task.assigned_to)
            .await?
            .map(|user| user.full_name)
            .unwrap_or_else(|| "the assignee".to_string());
        let message = notifier::task_completed(&task.title, &assignee);
        notify(db.get_ref(), task.assigned_by, &message, MessageType::Completion).await?;
        log::info!("Task {} completed by manager edit", task.id);
    }

    log::info!("Task updated successfully: {}", task_id);
    let now = current_instant(services.clock.as_ref());
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "Task updated successfully",
        TaskResponse::from_task(task, now),
    )))
}

/// Report progress on a task as its assignee
#[utoipa::path(
    put,
    path = "/api/tasks/{id}/progress",
    tag = "tasks",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = Uuid, Path, description = "Task ID")
    ),
    request_body = ProgressUpdateRequest,
    responses(
        (status = 200, description = "Progress saved", body = ApiResponse<TaskResponse>),
        (status = 403, description = "Caller is not the assignee", body = crate::utils::errors::ServiceError),
        (status = 404, description = "Task not found", body = crate::utils::errors::ServiceError)
    )
)]
pub async fn update_progress(
    auth: BearerAuth,
    db: web::Data<Database>,
    config: web::Data<AppConfig>,
    services: web::Data<AppServices>,
    path: web::Path<Uuid>,
    progress_req: web::Json<ProgressUpdateRequest>,
) -> Result<HttpResponse, ServiceError> {
    let task_id = path.into_inner();
    log::info!("PUT /api/tasks/{}/progress - {}%", task_id, progress_req.progress);

    let (user_id, claims) = current_user(&auth, &config)?;
    progress_req.validate()?;

    let existing = load_task(&db, task_id).await?;
    if existing.assigned_to != user_id {
        return Err(ServiceError::Forbidden("Only the assignee can report progress".to_string()));
    }

    let status = TaskStatus::from_progress(progress_req.progress);
    let task = db.update_progress(task_id, progress_req.progress, status).await?;

    if became_completed(existing.status, status) {
        let message = notifier::task_completed(&task.title, &claims.name);
        notify(db.get_ref(), task.assigned_by, &message, MessageType::Completion).await?;
        log::info!("Task {} completed, manager {} notified", task.id, task.assigned_by);
    }

    let now = current_instant(services.clock.as_ref());
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "Progress saved",
        TaskResponse::from_task(task, now),
    )))
}

pub fn task_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/tasks")
            .route("", web::post().to(create_task))
            .route("", web::get().to(get_tasks))
            .route("/{id}", web::get().to(get_task))
            .route("/{id}", web::put().to(update_task))
            .route("/{id}/progress", web::put().to(update_progress))
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn due_date_validation() {
        assert!(validate_due_date(None).is_ok());
        assert!(validate_due_date(Some("2026-01-20T17:00:00+05:30")).is_ok());
        assert!(matches!(
            validate_due_date(Some("friday")),
            Err(ServiceError::ValidationError(_))
        ));
        assert!(validate_due_date(Some("2026-01-20")).is_ok());
    }

    #[test]
    fn completion_fires_only_on_transition() {
        assert!(became_completed(TaskStatus::Pending, TaskStatus::Completed));
        assert!(became_completed(TaskStatus::InProgress, TaskStatus::Completed));
        assert!(!became_completed(TaskStatus::Completed, TaskStatus::Completed));
        assert!(!became_completed(TaskStatus::Pending, TaskStatus::InProgress));
        assert!(!became_completed(TaskStatus::Completed, TaskStatus::Pending));
    }
}
