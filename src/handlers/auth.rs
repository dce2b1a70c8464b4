//! Authentication HTTP handlers.
//!
//! - POST /api/v1/auth/login - Authenticate and receive a bearer token
//! - POST /api/v1/auth/change-password - Rotate the caller's password

use crate::{
    error::AppError,
    middleware::auth::AuthContext,
    models::user::{ChangePasswordRequest, LoginRequest, LoginResponse},
    services::auth_service,
    state::AppState,
};
use axum::{Extension, Json, extract::State, http::StatusCode};

/// Log in with a username and password.
///
/// # Endpoint
///
/// `POST /api/v1/auth/login` (public)
///
/// # Response
///
/// - **Success (200 OK)**: `{ "token": "...", "user": { ... } }`
/// - **Error (401)**: unknown user, wrong password, or deactivated account
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let response = auth_service::login(&state.pool, &state.auth_keys, request).await?;
    Ok(Json(response))
}

/// Change the calling user's password.
///
/// # Endpoint
///
/// `POST /api/v1/auth/change-password`
///
/// The current password is required again; a bearer token alone is not
/// enough to rotate credentials.
///
/// # Response
///
/// - **Success (204 No Content)**
/// - **Error (401)**: current password did not verify
/// - **Error (400)**: new password too short
pub async fn change_password(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<StatusCode, AppError> {
    auth_service::change_password(&state.pool, auth.user_id, request).await?;
    Ok(StatusCode::NO_CONTENT)
}
