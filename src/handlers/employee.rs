use actix_web::{web, HttpResponse, Result};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::database::Database;
use crate::handlers::current_user;
use crate::models::auth::{ApiResponse, Role, UserResponse};
use crate::services::stats::{employee_stats, performance_prompt, EmployeeStats};
use crate::state::AppServices;
use crate::utils::errors::ServiceError;
use crate::utils::time::current_instant;

#[derive(Debug, Serialize, ToSchema)]
pub struct EmployeeReport {
    pub employee: UserResponse,
    pub stats: EmployeeStats,
    /// Present only when an AI completion backend is configured and answered.
    pub analysis: Option<String>,
}

/// List every employee a task can be assigned to
#[utoipa::path(
    get,
    path = "/api/employees",
    tag = "employees",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Employees retrieved", body = ApiResponse<Vec<UserResponse>>),
        (status = 403, description = "Caller is not a manager", body = crate::utils::errors::ServiceError)
    )
)]
pub async fn get_employees(
    auth: BearerAuth,
    db: web::Data<Database>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, ServiceError> {
    log::info!("GET /api/employees");

    let (_, claims) = current_user(&auth, &config)?;
    claims.require_manager()?;

    let employees: Vec<UserResponse> = db
        .list_employees()
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success("Employees retrieved", employees)))
}

/// Performance statistics for one employee
#[utoipa::path(
    get,
    path = "/api/employees/{id}/stats",
    tag = "employees",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = Uuid, Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Report generated", body = ApiResponse<EmployeeReport>),
        (status = 403, description = "Caller is not a manager", body = crate::utils::errors::ServiceError),
        (status = 404, description = "Employee not found", body = crate::utils::errors::ServiceError)
    )
)]
pub async fn get_employee_stats(
    auth: BearerAuth,
    db: web::Data<Database>,
    config: web::Data<AppConfig>,
    services: web::Data<AppServices>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    let employee_id = path.into_inner();
    log::info!("GET /api/employees/{}/stats", employee_id);

    let (_, claims) = current_user(&auth, &config)?;
    claims.require_manager()?;

    let employee = match db.find_user(employee_id).await? {
        Some(user) if user.role == Role::Employee => user,
        _ => return Err(ServiceError::NotFound("Employee not found".to_string())),
    };

    let tasks = db.list_tasks_assigned_to(employee_id).await?;
    let stats = employee_stats(&tasks, current_instant(services.clock.as_ref()));

    // The report is still useful without the AI paragraph.
    let analysis = match services.completion {
        Some(ref client) => match client.complete(&performance_prompt(&employee.full_name, &stats)).await {
            Ok(text) => Some(text),
            Err(e) => {
                log::warn!("Performance analysis unavailable: {}", e);
                None
            }
        },
        None => None,
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "Report generated",
        EmployeeReport {
            employee: UserResponse::from(employee),
            stats,
            analysis,
        },
    )))
}

pub fn employee_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/employees")
            .route("", web::get().to(get_employees))
            .route("/{id}/stats", web::get().to(get_employee_stats))
    );
}
