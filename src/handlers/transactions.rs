//! Transfer transaction HTTP handlers.
//!
//! - POST /api/v1/transactions - Create a transfer at the origin branch
//! - GET /api/v1/transactions - List transfers in scope (filterable)
//! - GET /api/v1/transactions/{id} - Get one transfer
//! - POST /api/v1/transactions/{id}/complete - Pay out at the destination
//! - POST /api/v1/transactions/{id}/cancel - Cancel and refund the sender

use crate::{
    error::AppError,
    middleware::auth::AuthContext,
    models::transaction::{CreateTransferRequest, TransactionFilter, TransactionResponse},
    services::transaction_service,
    state::AppState,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use uuid::Uuid;

/// Create a transfer.
///
/// The origin branch is the caller's own; a director names it in the body.
/// Tax is computed server-side from the origin branch's rate and frozen on
/// the transaction.
///
/// # Response (200)
///
/// ```json
/// {
///   "id": "770e8400-...",
///   "reference": "TR-1A2B3C4D5E",
///   "currency": "usd",
///   "base_amount": 50000,
///   "tax_amount": 1250,
///   "amount": 51250,
///   "status": "pending",
///   ...
/// }
/// ```
pub async fn create_transaction(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<CreateTransferRequest>,
) -> Result<Json<TransactionResponse>, AppError> {
    let transaction = transaction_service::create_transfer(
        &state.pool,
        auth.user_id,
        auth.role,
        auth.branch_id,
        request,
    )
    .await?;

    // The origin balance moved.
    state.cache.invalidate_prefix("branches:");

    Ok(Json(transaction.into()))
}

/// List transfers, newest first.
///
/// # Query Parameters
///
/// - `branch_id`: match origin or destination (directors only; others are
///   pinned to their own branch)
/// - `status`: `pending` / `completed` / `cancelled`
/// - `from`, `to`: creation-time window
pub async fn list_transactions(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(filter): Query<TransactionFilter>,
) -> Result<Json<Vec<TransactionResponse>>, AppError> {
    let transactions =
        transaction_service::list_transactions(&state.pool, filter, auth.branch_scope()).await?;

    Ok(Json(transactions.into_iter().map(Into::into).collect()))
}

/// Get one transfer by ID.
///
/// Returns 404 for transfers that exist but touch neither side of the
/// caller's branch.
pub async fn get_transaction(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(transaction_id): Path<Uuid>,
) -> Result<Json<TransactionResponse>, AppError> {
    let transaction =
        transaction_service::get_transaction(&state.pool, transaction_id, auth.branch_scope())
            .await?;

    Ok(Json(transaction.into()))
}

/// Pay out a pending transfer to the receiver.
///
/// Destination-branch staff (or a director) only.
///
/// # Errors
///
/// - **403**: caller is not at the destination branch
/// - **422**: transfer is not pending, or the destination till cannot
///   cover the payout
pub async fn complete_transaction(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(transaction_id): Path<Uuid>,
) -> Result<Json<TransactionResponse>, AppError> {
    let transaction = transaction_service::complete_transfer(
        &state.pool,
        transaction_id,
        auth.user_id,
        auth.branch_scope(),
    )
    .await?;

    state.cache.invalidate_prefix("branches:");

    Ok(Json(transaction.into()))
}

/// Cancel a pending transfer and refund the sender in full.
///
/// Origin-branch staff (or a director) only.
pub async fn cancel_transaction(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(transaction_id): Path<Uuid>,
) -> Result<Json<TransactionResponse>, AppError> {
    let transaction = transaction_service::cancel_transfer(
        &state.pool,
        transaction_id,
        auth.user_id,
        auth.branch_scope(),
    )
    .await?;

    state.cache.invalidate_prefix("branches:");

    Ok(Json(transaction.into()))
}
