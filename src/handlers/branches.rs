//! Branch management HTTP handlers.
//!
//! - GET /api/v1/branches - List branches (cached)
//! - POST /api/v1/branches - Create a branch (director)
//! - GET /api/v1/branches/{id} - Get one branch
//! - PUT /api/v1/branches/{id} - Update branch details (director)
//! - DELETE /api/v1/branches/{id} - Delete an unused branch (director)

use crate::{
    error::AppError,
    middleware::auth::AuthContext,
    models::branch::{Branch, BranchResponse, CreateBranchRequest, UpdateBranchRequest},
    state::AppState,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::Value;
use uuid::Uuid;

const CACHE_KEY: &str = "branches:all";
const CACHE_PREFIX: &str = "branches:";

/// List all branches, newest first.
///
/// Every client screen needs the branch list (destination pickers, report
/// filters), so the rendered response is cached for the configured TTL and
/// invalidated by any branch or balance write.
pub async fn list_branches(
    State(state): State<AppState>,
    Extension(_auth): Extension<AuthContext>,
) -> Result<Json<Value>, AppError> {
    if let Some(cached) = state.cache.get(CACHE_KEY) {
        return Ok(Json(cached));
    }

    let branches =
        sqlx::query_as::<_, Branch>("SELECT * FROM branches ORDER BY created_at DESC")
            .fetch_all(&state.pool)
            .await?;

    let responses: Vec<BranchResponse> = branches.into_iter().map(Into::into).collect();
    let value = serde_json::to_value(&responses).map_err(|_| AppError::Internal)?;

    state.cache.put(CACHE_KEY, value.clone());

    Ok(Json(value))
}

/// Create a new branch.
///
/// # Authorization
///
/// Director only. Balances start at zero; money arrives only through
/// allocation events.
///
/// # Response
///
/// - **Success (200 OK)**: the created branch
/// - **Error (400)**: empty name, duplicate name, or bad tax rate
pub async fn create_branch(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<CreateBranchRequest>,
) -> Result<Json<BranchResponse>, AppError> {
    auth.require_director()?;
    validate_branch_details(&request.name, request.tax_rate_bp)?;

    let name_taken: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM branches WHERE name = $1)")
            .bind(request.name.trim())
            .fetch_one(&state.pool)
            .await?;
    if name_taken {
        return Err(AppError::InvalidRequest(
            "A branch with this name already exists".to_string(),
        ));
    }

    let branch = sqlx::query_as::<_, Branch>(
        r#"
        INSERT INTO branches (name, location, tax_rate_bp)
        VALUES ($1, $2, $3)
        RETURNING *
        "#,
    )
    .bind(request.name.trim())
    .bind(request.location.trim())
    .bind(request.tax_rate_bp)
    .fetch_one(&state.pool)
    .await?;

    state.cache.invalidate_prefix(CACHE_PREFIX);

    Ok(Json(branch.into()))
}

/// Get a specific branch by ID.
pub async fn get_branch(
    State(state): State<AppState>,
    Extension(_auth): Extension<AuthContext>,
    Path(branch_id): Path<Uuid>,
) -> Result<Json<BranchResponse>, AppError> {
    let branch = sqlx::query_as::<_, Branch>("SELECT * FROM branches WHERE id = $1")
        .bind(branch_id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or(AppError::BranchNotFound)?;

    Ok(Json(branch.into()))
}

/// Update branch details (name, location, tax rate).
///
/// # Authorization
///
/// Director only. Balances are not updatable here; they move exclusively
/// through the funds endpoints. Rate changes apply to future transfers
/// only, since each transaction froze its rate at creation.
///
/// # Response
///
/// - **Success (200 OK)**: the updated branch
/// - **Error (400)**: empty name, name taken by another branch, or bad
///   tax rate
pub async fn update_branch(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(branch_id): Path<Uuid>,
    Json(request): Json<UpdateBranchRequest>,
) -> Result<Json<BranchResponse>, AppError> {
    auth.require_director()?;
    validate_branch_details(&request.name, request.tax_rate_bp)?;

    let name_taken: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM branches WHERE name = $1 AND id <> $2)",
    )
    .bind(request.name.trim())
    .bind(branch_id)
    .fetch_one(&state.pool)
    .await?;
    if name_taken {
        return Err(AppError::InvalidRequest(
            "A branch with this name already exists".to_string(),
        ));
    }

    let branch = sqlx::query_as::<_, Branch>(
        r#"
        UPDATE branches
        SET name = $1, location = $2, tax_rate_bp = $3, updated_at = NOW()
        WHERE id = $4
        RETURNING *
        "#,
    )
    .bind(request.name.trim())
    .bind(request.location.trim())
    .bind(request.tax_rate_bp)
    .bind(branch_id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(AppError::BranchNotFound)?;

    state.cache.invalidate_prefix(CACHE_PREFIX);

    Ok(Json(branch.into()))
}

/// Delete a branch that has no staff, ledger history, or transactions.
///
/// # Authorization
///
/// Director only. A branch with any activity is refused; history must stay
/// explainable.
pub async fn delete_branch(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(branch_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    auth.require_director()?;

    let has_activity: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(SELECT 1 FROM users WHERE branch_id = $1)
            OR EXISTS(SELECT 1 FROM branch_funds WHERE branch_id = $1)
            OR EXISTS(SELECT 1 FROM transactions WHERE from_branch_id = $1 OR to_branch_id = $1)
        "#,
    )
    .bind(branch_id)
    .fetch_one(&state.pool)
    .await?;

    if has_activity {
        return Err(AppError::InvalidRequest(
            "Branch has staff or transaction history and cannot be deleted".to_string(),
        ));
    }

    let deleted = sqlx::query("DELETE FROM branches WHERE id = $1")
        .bind(branch_id)
        .execute(&state.pool)
        .await?
        .rows_affected();

    if deleted == 0 {
        return Err(AppError::BranchNotFound);
    }

    state.cache.invalidate_prefix(CACHE_PREFIX);

    Ok(StatusCode::NO_CONTENT)
}

fn validate_branch_details(name: &str, tax_rate_bp: i32) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::InvalidRequest(
            "Branch name is required".to_string(),
        ));
    }
    if !(0..=10_000).contains(&tax_rate_bp) {
        return Err(AppError::InvalidRequest(
            "Tax rate must be between 0 and 10000 basis points".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn branch_details_validation() {
        assert!(validate_branch_details("Damascus", 250).is_ok());
        assert!(validate_branch_details("  ", 250).is_err());
        assert!(validate_branch_details("Damascus", -1).is_err());
        assert!(validate_branch_details("Damascus", 10_001).is_err());
        assert!(validate_branch_details("Damascus", 10_000).is_ok());
    }
}
