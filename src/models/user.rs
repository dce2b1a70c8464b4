//! User data models and API request/response types.
//!
//! Covers both authentication payloads (login, change-password) and the
//! employee CRUD bodies. The `password_hash` column never leaves the server;
//! every outward shape goes through `UserResponse`.

use super::types::UserRole;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a user record from the database.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    /// Unique identifier for this user
    pub id: Uuid,

    /// Login name (unique)
    pub username: String,

    /// Argon2 hash of the password; never serialized
    pub password_hash: String,

    /// Display name
    pub full_name: String,

    /// Role gating what this user may do
    pub role: UserRole,

    /// Branch this user works at; NULL only for the director
    pub branch_id: Option<Uuid>,

    /// Inactive users cannot log in. Deactivation is the delete operation
    /// so historical transactions keep a valid creator reference.
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for `POST /api/v1/auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response body for a successful login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Bearer token for subsequent requests
    pub token: String,
    pub user: UserResponse,
}

/// Request body for `POST /api/v1/auth/change-password`.
///
/// The current password is re-verified so a stolen token alone cannot
/// rotate credentials.
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Request body for creating an employee or branch manager.
///
/// # JSON Example
///
/// ```json
/// {
///   "username": "a.haddad",
///   "password": "s3cret",
///   "full_name": "Amin Haddad",
///   "role": "employee",
///   "branch_id": "550e8400-e29b-41d4-a716-446655440000"
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct CreateEmployeeRequest {
    pub username: String,
    pub password: String,
    pub full_name: String,
    pub role: UserRole,
    pub branch_id: Uuid,
}

/// Request body for updating an employee.
///
/// `password` is optional; when present the credential is rotated.
#[derive(Debug, Deserialize)]
pub struct UpdateEmployeeRequest {
    pub full_name: String,
    pub role: UserRole,
    pub branch_id: Uuid,
    pub is_active: bool,
    pub password: Option<String>,
}

/// Response body for user endpoints. Excludes the password hash.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    pub role: UserRole,
    pub branch_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            full_name: user.full_name,
            role: user.role,
            branch_id: user.branch_id,
            is_active: user.is_active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}
