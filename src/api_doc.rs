use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::handlers;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Taskflow Backend API",
        description = "Task assignment, progress tracking and deadline escalation"
    ),
    paths(
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::get_me,
        handlers::task::create_task,
        handlers::task::get_tasks,
        handlers::task::get_task,
        handlers::task::update_task,
        handlers::task::update_progress,
        handlers::notification::get_notifications,
        handlers::employee::get_employees,
        handlers::employee::get_employee_stats,
        handlers::deadline::trigger_sweep,
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Registration and login"),
        (name = "tasks", description = "Task assignment and progress"),
        (name = "notifications", description = "Per-user notification feed"),
        (name = "employees", description = "Team directory and reports"),
        (name = "deadlines", description = "Deadline escalation sweep")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
