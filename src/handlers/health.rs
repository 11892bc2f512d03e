use actix_web::{web, HttpResponse, Result};
use serde_json::json;

use crate::models::auth::ApiResponse;
use crate::database::Database;

pub async fn health_check(db: web::Data<Database>) -> Result<HttpResponse> {
    match db.health_check().await {
        Ok(_) => {
            let stats = db.get_stats().await.unwrap_or_default();

            Ok(HttpResponse::Ok().json(ApiResponse::success(
                "Task tracking API is running",
                json!({
                    "status": "ok",
                    "database": "connected",
                    "stats": {
                        "users": stats.users,
                        "tasks": stats.tasks,
                        "pending_tasks": stats.pending_tasks,
                        "messages": stats.messages
                    }
                })
            )))
        }
        Err(e) => {
            log::error!("Database health check failed: {}", e);
            Ok(HttpResponse::ServiceUnavailable().json(json!({
                "status": "error",
                "message": "Database connection failed",
                "error": e.to_string()
            })))
        }
    }
}

pub async fn index() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "name": "Taskflow Backend API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Task assignment, progress tracking and deadline escalation"
    }))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/", web::get().to(index));
}
