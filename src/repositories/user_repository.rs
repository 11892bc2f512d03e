use uuid::Uuid;

use crate::database::Database;
use crate::models::auth::{Role, User};
use crate::utils::errors::ServiceError;

const USER_COLUMNS: &str = "id, email, full_name, role, password_hash, created_at";

impl Database {
    pub async fn create_user(
        &self,
        email: &str,
        full_name: &str,
        role: Role,
        password_hash: &str,
    ) -> Result<User, ServiceError> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, full_name, role, password_hash)
             VALUES ($1, $2, $3, $4)
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(email)
        .bind(full_name)
        .bind(role.as_str())
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                log::warn!("Registration rejected, email already used: {}", email);
                ServiceError::ValidationError("Email is already registered".to_string())
            }
            _ => {
                log::error!("Database error creating user: {}", e);
                ServiceError::DatabaseError("Failed to create user".to_string())
            }
        })
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, ServiceError> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE lower(email) = lower($1)",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            log::error!("Database error querying user by email: {}", e);
            ServiceError::DatabaseError("Failed to query user".to_string())
        })
    }

    pub async fn find_user(&self, user_id: Uuid) -> Result<Option<User>, ServiceError> {
        sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                log::error!("Database error querying user: {}", e);
                ServiceError::DatabaseError("Failed to query user".to_string())
            })
    }

    pub async fn list_employees(&self) -> Result<Vec<User>, ServiceError> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE role = $1 ORDER BY full_name",
            USER_COLUMNS
        ))
        .bind(Role::Employee.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            log::error!("Database error listing employees: {}", e);
            ServiceError::DatabaseError("Failed to list employees".to_string())
        })
    }

    /// Case-insensitive exact match on an employee's full name.
    pub async fn find_employee_by_name(&self, full_name: &str) -> Result<Option<User>, ServiceError> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE role = $1 AND lower(full_name) = lower($2) LIMIT 1",
            USER_COLUMNS
        ))
        .bind(Role::Employee.as_str())
        .bind(full_name.trim())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            log::error!("Database error looking up employee '{}': {}", full_name, e);
            ServiceError::DatabaseError("Failed to query employee".to_string())
        })
    }
}
