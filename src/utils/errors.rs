use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use crate::models::auth::ErrorResponse;

#[derive(Debug, Error, Serialize, ToSchema)]
pub enum ServiceError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Not Found: {0}")]
    NotFound(String),
    #[error("Internal Error: {0}")]
    InternalError(String),
    #[error("Database Error: {0}")]
    DatabaseError(String),
    #[error("Validation Error: {0}")]
    ValidationError(String),
    #[error("Authentication Error: {0}")]
    AuthenticationError(String),
    #[error("External Service Error: {0}")]
    ExternalService(String),
}

impl ServiceError {
    fn error_body(message: &str) -> ErrorResponse {
        ErrorResponse {
            status: "error".to_string(),
            message: message.to_string(),
        }
    }

    /// Text safe to show to a caller. Internal and upstream detail is replaced
    /// by a fixed message.
    pub fn public_message(&self) -> &str {
        match self {
            ServiceError::Unauthorized(msg)
            | ServiceError::AuthenticationError(msg)
            | ServiceError::Forbidden(msg)
            | ServiceError::NotFound(msg)
            | ServiceError::ValidationError(msg) => msg,
            // Don't expose internal details
            ServiceError::InternalError(_) => "Something went wrong",
            ServiceError::DatabaseError(_) => "Database operation failed",
            ServiceError::ExternalService(_) => "Upstream service unavailable",
        }
    }
}

impl ResponseError for ServiceError {
    fn error_response(&self) -> HttpResponse {
        log::error!("{}", self);
        let body = Self::error_body(self.public_message());
        match self {
            ServiceError::Unauthorized(_) | ServiceError::AuthenticationError(_) => {
                HttpResponse::Unauthorized().json(body)
            }
            ServiceError::Forbidden(_) => HttpResponse::Forbidden().json(body),
            ServiceError::NotFound(_) => HttpResponse::NotFound().json(body),
            ServiceError::ValidationError(_) => HttpResponse::BadRequest().json(body),
            ServiceError::InternalError(_) | ServiceError::DatabaseError(_) => {
                HttpResponse::InternalServerError().json(body)
            }
            ServiceError::ExternalService(_) => HttpResponse::BadGateway().json(body),
        }
    }
}

// Convert sqlx errors to ServiceError
impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ServiceError::NotFound("Record not found".to_string()),
            _ => ServiceError::DatabaseError(err.to_string()),
        }
    }
}

// Convert bcrypt errors to ServiceError
impl From<bcrypt::BcryptError> for ServiceError {
    fn from(err: bcrypt::BcryptError) -> Self {
        ServiceError::InternalError(format!("Password hashing error: {}", err))
    }
}

// Convert JWT errors to ServiceError
impl From<jsonwebtoken::errors::Error> for ServiceError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        ServiceError::AuthenticationError(format!("JWT error: {}", err))
    }
}

// Drops the request URL, which can carry the bot token
impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        ServiceError::ExternalService(err.without_url().to_string())
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}
