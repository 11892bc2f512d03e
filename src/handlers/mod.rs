use actix_web_httpauth::extractors::bearer::BearerAuth;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::utils::errors::ServiceError;
use crate::utils::jwt::{decode_token, Claims};

pub mod auth;
pub mod deadline;
pub mod employee;
pub mod health;
pub mod notification;
pub mod task;
pub mod webhook;

pub use auth::auth_config;
pub use deadline::deadline_config;
pub use employee::employee_config;
pub use notification::notification_config;
pub use task::task_config;
pub use webhook::webhook_config;

// Resolve the bearer token into the caller's id and claims
pub(crate) fn current_user(
    auth: &BearerAuth,
    config: &AppConfig,
) -> Result<(Uuid, Claims), ServiceError> {
    let claims = decode_token(auth.token(), &config.jwt_secret)?;
    let user_id = claims.user_id()?;
    Ok((user_id, claims))
}
