//! Notification HTTP handlers.
//!
//! - GET /api/v1/notifications - List notifications for the caller's branch
//! - POST /api/v1/notifications/{id}/read - Mark one as read
//!
//! The client polls the list; rows are written by the transfer and
//! allocation flows inside their own database transactions.

use crate::{
    error::AppError,
    middleware::auth::AuthContext,
    models::notification::Notification,
    services::notification_service,
    state::AppState,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use uuid::Uuid;

/// List notifications, unread first, newest first.
///
/// Staff see their branch's notifications; the director sees all.
pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<Notification>>, AppError> {
    let notifications =
        notification_service::list_notifications(&state.pool, auth.branch_scope()).await?;

    Ok(Json(notifications))
}

/// Mark a notification as read.
///
/// Returns 404 for notifications of other branches.
pub async fn mark_read(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(notification_id): Path<Uuid>,
) -> Result<Json<Notification>, AppError> {
    let notification =
        notification_service::mark_read(&state.pool, notification_id, auth.branch_scope()).await?;

    Ok(Json(notification))
}
