use actix_web::{web, HttpResponse, Result};
use actix_web_httpauth::extractors::bearer::BearerAuth;

use crate::config::AppConfig;
use crate::database::Database;
use crate::handlers::current_user;
use crate::models::auth::ApiResponse;
use crate::services::deadline::{run_deadline_sweep, SweepReport};
use crate::state::AppServices;
use crate::utils::errors::ServiceError;

/// Run one deadline sweep now
#[utoipa::path(
    post,
    path = "/api/deadlines/sweep",
    tag = "deadlines",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Sweep finished", body = ApiResponse<SweepReport>),
        (status = 401, description = "Unauthorized", body = crate::utils::errors::ServiceError)
    )
)]
pub async fn trigger_sweep(
    auth: BearerAuth,
    db: web::Data<Database>,
    config: web::Data<AppConfig>,
    services: web::Data<AppServices>,
) -> Result<HttpResponse, ServiceError> {
    log::info!("POST /api/deadlines/sweep");

    let (user_id, _) = current_user(&auth, &config)?;
    log::info!("Deadline sweep requested by {}", user_id);

    let report = run_deadline_sweep(db.get_ref(), services.clock.as_ref()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success("Deadline sweep finished", report)))
}

pub fn deadline_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/deadlines/sweep", web::post().to(trigger_sweep));
}
