use actix_web::{web, HttpResponse, Result};
use actix_web_httpauth::extractors::bearer::BearerAuth;

use crate::config::AppConfig;
use crate::database::Database;
use crate::handlers::current_user;
use crate::models::auth::ApiResponse;
use crate::models::notification::{Notification, NotificationQuery};
use crate::repositories::NotificationStore;
use crate::utils::errors::ServiceError;

/// List the caller's notifications, newest first
#[utoipa::path(
    get,
    path = "/api/notifications",
    tag = "notifications",
    security(
        ("bearer_auth" = [])
    ),
    params(NotificationQuery),
    responses(
        (status = 200, description = "Notifications retrieved", body = ApiResponse<Vec<Notification>>),
        (status = 401, description = "Unauthorized", body = crate::utils::errors::ServiceError)
    )
)]
pub async fn get_notifications(
    auth: BearerAuth,
    db: web::Data<Database>,
    config: web::Data<AppConfig>,
    query: web::Query<NotificationQuery>,
) -> Result<HttpResponse, ServiceError> {
    log::info!("GET /api/notifications");

    let (user_id, _) = current_user(&auth, &config)?;

    let mut messages = db.list_for_recipient(user_id).await?;
    if let Some(limit) = query.limit {
        messages.truncate(limit);
    }

    log::info!("Retrieved {} notifications for {}", messages.len(), user_id);
    Ok(HttpResponse::Ok().json(ApiResponse::success("Notifications retrieved", messages)))
}

pub fn notification_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/notifications", web::get().to(get_notifications));
}
