//! Administrative HTTP handlers: backup and restore.
//!
//! - GET /api/v1/admin/backup - Download a database snapshot
//! - POST /api/v1/admin/restore - Destructively restore from a snapshot
//!
//! Both are director-only. The snapshot is self-verifying (version +
//! checksum), so a damaged download is rejected before restore touches
//! anything.

use crate::{
    error::AppError,
    middleware::auth::AuthContext,
    services::backup_service::{self, Snapshot},
    state::AppState,
};
use axum::{
    Extension, Json,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};

/// Download a full database snapshot.
///
/// Served as an attachment so the desktop client drops it straight into a
/// save dialog.
pub async fn backup(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<impl IntoResponse, AppError> {
    auth.require_director()?;

    let snapshot = backup_service::export_snapshot(&state.pool).await?;

    Ok((
        [(
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"transfer-backup.json\"",
        )],
        Json(snapshot),
    ))
}

/// Restore the database from an uploaded snapshot.
///
/// # Response
///
/// - **Success (204 No Content)**: everything replaced
/// - **Error (400)**: version, checksum, or field-value verification
///   failed; the database was not touched
pub async fn restore(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(snapshot): Json<Snapshot>,
) -> Result<StatusCode, AppError> {
    auth.require_director()?;

    backup_service::restore_snapshot(&state.pool, snapshot).await?;

    // Everything the caches knew is gone.
    state.cache.invalidate_prefix("");

    Ok(StatusCode::NO_CONTENT)
}
