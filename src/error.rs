//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses. The response body carries a machine-readable `code`
//! and a human-readable `detail` message, which is what the desktop client
//! displays in its dialogs.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Application-wide error type.
///
/// Each variant maps to a specific HTTP status code.
///
/// # Error Categories
///
/// - **Database errors**: any sqlx::Error from database operations
/// - **Authentication errors**: bad credentials, missing/expired tokens
/// - **Authorization errors**: role does not permit the operation
/// - **Resource errors**: requested rows not found
/// - **Business rule errors**: insufficient balance, out-of-range amounts,
///   illegal status transitions
/// - **Validation errors**: malformed request data
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Database operation failed (e.g., connection error, query error).
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Username/password pair did not match an active user.
    ///
    /// Returns HTTP 401 Unauthorized.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Bearer token is missing, malformed, or expired.
    ///
    /// Returns HTTP 401 Unauthorized.
    #[error("Invalid or expired token")]
    InvalidToken,

    /// The authenticated user's role does not permit this operation.
    ///
    /// Returns HTTP 403 Forbidden.
    #[error("Operation not permitted for this role")]
    Forbidden,

    /// Requested branch does not exist.
    ///
    /// Returns HTTP 404 Not Found.
    #[error("Branch not found")]
    BranchNotFound,

    /// Requested user does not exist or is outside the caller's scope.
    ///
    /// Returns HTTP 404 Not Found.
    #[error("User not found")]
    UserNotFound,

    /// Requested transaction does not exist.
    ///
    /// Returns HTTP 404 Not Found.
    #[error("Transaction not found")]
    TransactionNotFound,

    /// Requested notification does not exist.
    ///
    /// Returns HTTP 404 Not Found.
    #[error("Notification not found")]
    NotificationNotFound,

    /// Requested allocation event does not exist.
    ///
    /// Returns HTTP 404 Not Found.
    #[error("Allocation not found")]
    AllocationNotFound,

    /// Branch balance cannot cover the requested deduction or payout.
    ///
    /// Returns HTTP 422 Unprocessable Entity.
    #[error("Insufficient branch balance")]
    InsufficientBalance,

    /// Allocation amount falls outside the allowed range for its currency.
    ///
    /// Returns HTTP 422 Unprocessable Entity.
    #[error("Amount {amount} outside allowed range [{min}, {max}]")]
    AmountOutOfRange { amount: i64, min: i64, max: i64 },

    /// Transaction status does not admit the requested transition.
    ///
    /// Returns HTTP 422 Unprocessable Entity.
    #[error("Cannot move transaction from '{from}' to '{to}'")]
    InvalidStatusTransition { from: String, to: String },

    /// Restore snapshot failed verification (bad version, checksum, or
    /// field values).
    ///
    /// Returns HTTP 400 Bad Request.
    #[error("Invalid backup snapshot: {0}")]
    InvalidSnapshot(String),

    /// Request body or parameters are invalid.
    ///
    /// Returns HTTP 400 Bad Request.
    #[error("Invalid request")]
    InvalidRequest(String),

    /// Credential processing or response serialization failed.
    ///
    /// Returns HTTP 500 Internal Server Error.
    #[error("Internal processing error")]
    Internal,
}

/// Convert AppError into an HTTP response.
///
/// Handlers return `Result<T, AppError>` and errors become JSON bodies:
///
/// ```json
/// {
///   "code": "insufficient_balance",
///   "detail": "Insufficient branch balance"
/// }
/// ```
///
/// Database errors are reported as a generic 500 so internals never leak
/// to the client.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, detail) = match self {
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "invalid_credentials",
                self.to_string(),
            ),
            AppError::InvalidToken => {
                (StatusCode::UNAUTHORIZED, "invalid_token", self.to_string())
            }
            AppError::Forbidden => (StatusCode::FORBIDDEN, "forbidden", self.to_string()),
            AppError::BranchNotFound => {
                (StatusCode::NOT_FOUND, "branch_not_found", self.to_string())
            }
            AppError::UserNotFound => (StatusCode::NOT_FOUND, "user_not_found", self.to_string()),
            AppError::TransactionNotFound => (
                StatusCode::NOT_FOUND,
                "transaction_not_found",
                self.to_string(),
            ),
            AppError::NotificationNotFound => (
                StatusCode::NOT_FOUND,
                "notification_not_found",
                self.to_string(),
            ),
            AppError::AllocationNotFound => (
                StatusCode::NOT_FOUND,
                "allocation_not_found",
                self.to_string(),
            ),
            AppError::InsufficientBalance => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "insufficient_balance",
                self.to_string(),
            ),
            AppError::AmountOutOfRange { .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "amount_out_of_range",
                self.to_string(),
            ),
            AppError::InvalidStatusTransition { .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "invalid_status_transition",
                self.to_string(),
            ),
            AppError::InvalidSnapshot(ref msg) => {
                (StatusCode::BAD_REQUEST, "invalid_snapshot", msg.clone())
            }
            AppError::InvalidRequest(ref msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", msg.clone())
            }
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "An internal error occurred".to_string(),
            ),
            AppError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "An internal error occurred".to_string(),
            ),
        };

        let body = Json(json!({
            "code": code,
            "detail": detail
        }));

        (status, body).into_response()
    }
}
