//! Employee management HTTP handlers.
//!
//! - GET /api/v1/employees - List staff in scope (cached)
//! - POST /api/v1/employees - Create an employee or branch manager
//! - GET /api/v1/employees/{id} - Get one employee
//! - PUT /api/v1/employees/{id} - Update an employee
//! - DELETE /api/v1/employees/{id} - Deactivate an employee
//!
//! The director manages every branch; a branch manager only their own, and
//! only plain employees. Deleting is deactivation so historical transfers
//! keep a valid creator.

use crate::{
    error::AppError,
    middleware::auth::AuthContext,
    models::{
        types::UserRole,
        user::{CreateEmployeeRequest, UpdateEmployeeRequest, User, UserResponse},
    },
    services::auth_service,
    state::AppState,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::Value;
use uuid::Uuid;

const CACHE_PREFIX: &str = "employees:";

/// Roles a caller may assign when creating or updating staff.
///
/// Nobody creates directors through this endpoint; a branch manager may
/// only manage plain employees.
fn assignable(caller: UserRole, target: UserRole) -> bool {
    match caller {
        UserRole::Director => target != UserRole::Director,
        UserRole::BranchManager => target == UserRole::Employee,
        UserRole::Employee => false,
    }
}

/// List employees visible to the caller, newest first.
///
/// Directors see every branch; a manager sees their own. Responses are
/// cached per scope and invalidated by any staff write.
pub async fn list_employees(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Value>, AppError> {
    auth.require_manager()?;

    let cache_key = match auth.branch_scope() {
        Some(branch) => format!("employees:branch:{branch}"),
        None => "employees:all".to_string(),
    };

    if let Some(cached) = state.cache.get(&cache_key) {
        return Ok(Json(cached));
    }

    let users = sqlx::query_as::<_, User>(
        r#"
        SELECT * FROM users
        WHERE role <> 'director'
          AND ($1::uuid IS NULL OR branch_id = $1)
        ORDER BY created_at DESC
        "#,
    )
    .bind(auth.branch_scope())
    .fetch_all(&state.pool)
    .await?;

    let responses: Vec<UserResponse> = users.into_iter().map(Into::into).collect();
    let value = serde_json::to_value(&responses).map_err(|_| AppError::Internal)?;

    state.cache.put(cache_key, value.clone());

    Ok(Json(value))
}

/// Create an employee or branch manager.
///
/// # Authorization
///
/// Director for any branch; a branch manager only for their own branch and
/// only with the `employee` role.
pub async fn create_employee(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<CreateEmployeeRequest>,
) -> Result<Json<UserResponse>, AppError> {
    if !auth.can_manage_branch(request.branch_id) || !assignable(auth.role, request.role) {
        return Err(AppError::Forbidden);
    }

    if request.username.trim().is_empty() || request.password.len() < 8 {
        return Err(AppError::InvalidRequest(
            "Username is required and password must be at least 8 characters".to_string(),
        ));
    }

    let branch_exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM branches WHERE id = $1)")
            .bind(request.branch_id)
            .fetch_one(&state.pool)
            .await?;
    if !branch_exists {
        return Err(AppError::BranchNotFound);
    }

    let username_taken: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
            .bind(request.username.trim())
            .fetch_one(&state.pool)
            .await?;
    if username_taken {
        return Err(AppError::InvalidRequest(
            "Username is already taken".to_string(),
        ));
    }

    let password_hash = auth_service::hash_password(&request.password)?;

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (username, password_hash, full_name, role, branch_id)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(request.username.trim())
    .bind(password_hash)
    .bind(request.full_name.trim())
    .bind(request.role)
    .bind(request.branch_id)
    .fetch_one(&state.pool)
    .await?;

    state.cache.invalidate_prefix(CACHE_PREFIX);

    Ok(Json(user.into()))
}

/// Get one employee by ID, scoped to the caller's branch.
pub async fn get_employee(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserResponse>, AppError> {
    auth.require_manager()?;

    let user = fetch_scoped_employee(&state, &auth, user_id).await?;

    Ok(Json(user.into()))
}

/// Update an employee's details, role, branch, or activation, optionally
/// rotating the password.
///
/// # Authorization
///
/// The caller must be able to manage both the employee's current branch
/// and the requested one, and may only assign roles within their reach.
pub async fn update_employee(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(user_id): Path<Uuid>,
    Json(request): Json<UpdateEmployeeRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let existing = fetch_scoped_employee(&state, &auth, user_id).await?;

    if !auth.can_manage_branch(request.branch_id)
        || !assignable(auth.role, request.role)
        || !assignable(auth.role, existing.role)
    {
        return Err(AppError::Forbidden);
    }

    let branch_exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM branches WHERE id = $1)")
            .bind(request.branch_id)
            .fetch_one(&state.pool)
            .await?;
    if !branch_exists {
        return Err(AppError::BranchNotFound);
    }

    let password_hash = match &request.password {
        Some(password) if password.len() < 8 => {
            return Err(AppError::InvalidRequest(
                "Password must be at least 8 characters".to_string(),
            ));
        }
        Some(password) => Some(auth_service::hash_password(password)?),
        None => None,
    };

    let user = sqlx::query_as::<_, User>(
        r#"
        UPDATE users
        SET full_name = $1,
            role = $2,
            branch_id = $3,
            is_active = $4,
            password_hash = COALESCE($5, password_hash),
            updated_at = NOW()
        WHERE id = $6
        RETURNING *
        "#,
    )
    .bind(request.full_name.trim())
    .bind(request.role)
    .bind(request.branch_id)
    .bind(request.is_active)
    .bind(password_hash)
    .bind(user_id)
    .fetch_one(&state.pool)
    .await?;

    state.cache.invalidate_prefix(CACHE_PREFIX);

    Ok(Json(user.into()))
}

/// Deactivate an employee.
///
/// Rows are never deleted; transfers keep their creator. Deactivated users
/// cannot log in and disappear from active rosters.
pub async fn delete_employee(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(user_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let existing = fetch_scoped_employee(&state, &auth, user_id).await?;

    if !assignable(auth.role, existing.role) {
        return Err(AppError::Forbidden);
    }
    if existing.id == auth.user_id {
        return Err(AppError::InvalidRequest(
            "You cannot deactivate your own account".to_string(),
        ));
    }

    sqlx::query("UPDATE users SET is_active = false, updated_at = NOW() WHERE id = $1")
        .bind(user_id)
        .execute(&state.pool)
        .await?;

    state.cache.invalidate_prefix(CACHE_PREFIX);

    Ok(StatusCode::NO_CONTENT)
}

/// Fetch a non-director user, returning 404 when it does not exist or sits
/// outside the caller's branch. Hiding out-of-scope staff avoids leaking
/// the roster of other branches.
async fn fetch_scoped_employee(
    state: &AppState,
    auth: &AuthContext,
    user_id: Uuid,
) -> Result<User, AppError> {
    auth.require_manager()?;

    let user = sqlx::query_as::<_, User>(
        "SELECT * FROM users WHERE id = $1 AND role <> 'director'",
    )
    .bind(user_id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(AppError::UserNotFound)?;

    if let Some(scope) = auth.branch_scope() {
        if user.branch_id != Some(scope) {
            return Err(AppError::UserNotFound);
        }
    }

    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn director_assigns_anything_but_director() {
        assert!(assignable(UserRole::Director, UserRole::BranchManager));
        assert!(assignable(UserRole::Director, UserRole::Employee));
        assert!(!assignable(UserRole::Director, UserRole::Director));
    }

    #[test]
    fn manager_assigns_employees_only() {
        assert!(assignable(UserRole::BranchManager, UserRole::Employee));
        assert!(!assignable(UserRole::BranchManager, UserRole::BranchManager));
        assert!(!assignable(UserRole::BranchManager, UserRole::Director));
    }

    #[test]
    fn employee_assigns_nothing() {
        assert!(!assignable(UserRole::Employee, UserRole::Employee));
    }
}
