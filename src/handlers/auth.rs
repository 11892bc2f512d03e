use actix_web::{web, HttpResponse, Result};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use bcrypt::{hash, verify, DEFAULT_COST};
use validator::Validate;

use crate::config::AppConfig;
use crate::database::Database;
use crate::handlers::current_user;
use crate::models::auth::{ApiResponse, LoginRequest, LoginResponseData, RegisterRequest, UserResponse};
use crate::services::deadline::run_deadline_sweep;
use crate::state::AppServices;
use crate::utils::errors::ServiceError;
use crate::utils::jwt::issue_token;

/// Register a new manager or employee
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = ApiResponse<UserResponse>),
        (status = 400, description = "Validation error", body = crate::utils::errors::ServiceError)
    )
)]
pub async fn register(
    db: web::Data<Database>,
    register_req: web::Json<RegisterRequest>,
) -> Result<HttpResponse, ServiceError> {
    log::info!("POST /api/auth/register - {}", register_req.email);

    register_req.validate()?;

    let password_hash = hash(&register_req.password, DEFAULT_COST)?;
    let user = db
        .create_user(
            register_req.email.trim(),
            register_req.full_name.trim(),
            register_req.role,
            &password_hash,
        )
        .await?;

    log::info!("User registered: {} ({})", user.email, user.role.as_str());
    Ok(HttpResponse::Created().json(ApiResponse::success(
        "Registered successfully",
        UserResponse::from(user),
    )))
}

/// User login endpoint. Starting a session also runs one deadline sweep.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<LoginResponseData>),
        (status = 401, description = "Invalid credentials", body = crate::utils::errors::ServiceError)
    )
)]
pub async fn login(
    db: web::Data<Database>,
    config: web::Data<AppConfig>,
    services: web::Data<AppServices>,
    login_req: web::Json<LoginRequest>,
) -> Result<HttpResponse, ServiceError> {
    log::info!("POST /api/auth/login - Login attempt for: {}", login_req.email);

    if login_req.email.trim().is_empty() {
        return Err(ServiceError::ValidationError("Email is required".to_string()));
    }

    let user = match db.find_user_by_email(login_req.email.trim()).await? {
        Some(user) => user,
        None => {
            log::warn!("Login failed: User not found - {}", login_req.email);
            return Err(ServiceError::Unauthorized("Invalid credentials".to_string()));
        }
    };

    let password_valid = verify(&login_req.password, &user.password_hash).map_err(|e| {
        log::error!("Password verification error: {}", e);
        ServiceError::AuthenticationError("Password verification failed".to_string())
    })?;

    if !password_valid {
        log::warn!("Login failed: Invalid password for user - {}", login_req.email);
        return Err(ServiceError::Unauthorized("Invalid credentials".to_string()));
    }

    let token = issue_token(user.id, &user.email, &user.full_name, user.role, &config.jwt_secret)?;

    if let Err(e) = run_deadline_sweep(db.get_ref(), services.clock.as_ref()).await {
        log::error!("Session deadline sweep failed: {}", e);
    }

    log::info!("Login successful for user: {}", user.email);
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "Login successful",
        LoginResponseData {
            token,
            user: UserResponse::from(user),
        },
    )))
}

/// Get current user information
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "auth",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "User information retrieved", body = ApiResponse<UserResponse>),
        (status = 401, description = "Unauthorized", body = crate::utils::errors::ServiceError)
    )
)]
pub async fn get_me(
    auth: BearerAuth,
    db: web::Data<Database>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, ServiceError> {
    log::info!("GET /api/auth/me");

    let (user_id, _) = current_user(&auth, &config)?;

    let user = db.find_user(user_id).await?.ok_or_else(|| {
        log::warn!("User not found for ID: {}", user_id);
        ServiceError::Unauthorized("User not found".to_string())
    })?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "Successfully retrieved user data",
        UserResponse::from(user),
    )))
}

pub fn auth_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/auth")
            .route("/register", web::post().to(register))
            .route("/login", web::post().to(login))
            .route("/me", web::get().to(get_me))
    );
}
