//! Fund allocation HTTP handlers.
//!
//! - POST /api/v1/branches/{id}/allocations - Allocate or deduct funds
//! - GET /api/v1/branches/{id}/allocations - List a branch's fund ledger
//! - DELETE /api/v1/allocations/{event_id} - Reverse an allocation event
//!
//! An allocation request may carry a SYP part and a USD part; both land or
//! neither does, and the DELETE undoes the whole event the same way.

use crate::{
    error::AppError,
    middleware::auth::AuthContext,
    models::branch_fund::{AllocateFundsRequest, AllocationEventResponse, BranchFund},
    services::ledger_service,
    state::AppState,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

/// Allocate or deduct branch funds.
///
/// # Authorization
///
/// Director only.
///
/// # Request Body
///
/// ```json
/// {
///   "syp": { "direction": "allocate", "amount": 5000000 },
///   "usd": { "direction": "deduct", "amount": 25000 },
///   "note": "weekly float adjustment"
/// }
/// ```
///
/// # Response
///
/// - **Success (200 OK)**: ledger rows written plus fresh balances
/// - **Error (422)**: amount out of range, or deduction exceeds balance
pub async fn allocate_funds(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(branch_id): Path<Uuid>,
    Json(request): Json<AllocateFundsRequest>,
) -> Result<Json<AllocationEventResponse>, AppError> {
    auth.require_director()?;

    let response =
        ledger_service::allocate_funds(&state.pool, branch_id, request, auth.user_id).await?;

    // Balances changed; cached branch listings are stale.
    state.cache.invalidate_prefix("branches:");

    Ok(Json(response))
}

/// List the fund ledger of a branch, newest first.
///
/// Directors read any branch; staff only their own.
pub async fn list_allocations(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(branch_id): Path<Uuid>,
) -> Result<Json<Vec<BranchFund>>, AppError> {
    if let Some(scope) = auth.branch_scope() {
        if scope != branch_id {
            return Err(AppError::Forbidden);
        }
    }

    let entries = ledger_service::list_branch_funds(&state.pool, branch_id).await?;

    Ok(Json(entries))
}

/// Reverse a whole allocation event.
///
/// # Authorization
///
/// Director only.
///
/// # Response
///
/// - **Success (204 No Content)**
/// - **Error (400)**: the event belongs to a transfer, not an operator
///   allocation
/// - **Error (404)**: no such event
/// - **Error (422)**: reversal would drive a balance negative
pub async fn delete_allocation(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(event_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    auth.require_director()?;

    ledger_service::reverse_event(&state.pool, event_id).await?;

    state.cache.invalidate_prefix("branches:");

    Ok(StatusCode::NO_CONTENT)
}
