//! Bearer-token authentication middleware.
//!
//! Intercepts every protected request to:
//! 1. Extract the token from the Authorization header
//! 2. Verify its signature and expiry
//! 3. Inject an `AuthContext` into the request extensions
//! 4. Reject bad tokens with HTTP 401

use crate::{error::AppError, models::types::UserRole, services::auth_service, state::AppState};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

/// Authentication context attached to authenticated requests.
///
/// Handlers extract this with `Extension<AuthContext>` to learn who is
/// calling and to gate operations by role and branch.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub username: String,
    pub role: UserRole,

    /// The caller's branch; `None` only for the director
    pub branch_id: Option<Uuid>,
}

impl AuthContext {
    /// Director-only operations: branch CRUD, fund allocation, backup.
    pub fn require_director(&self) -> Result<(), AppError> {
        if self.role == UserRole::Director {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }

    /// Operations for the director or a branch manager.
    pub fn require_manager(&self) -> Result<(), AppError> {
        match self.role {
            UserRole::Director | UserRole::BranchManager => Ok(()),
            UserRole::Employee => Err(AppError::Forbidden),
        }
    }

    /// Whether the caller may manage staff of `branch_id`.
    ///
    /// The director manages every branch; a manager only their own.
    pub fn can_manage_branch(&self, branch_id: Uuid) -> bool {
        match self.role {
            UserRole::Director => true,
            UserRole::BranchManager => self.branch_id == Some(branch_id),
            UserRole::Employee => false,
        }
    }

    /// Branch filter to apply to listings: directors see everything,
    /// everyone else sees their own branch.
    pub fn branch_scope(&self) -> Option<Uuid> {
        match self.role {
            UserRole::Director => None,
            _ => self.branch_id,
        }
    }
}

/// Token authentication middleware.
///
/// Expected header format:
///
/// ```text
/// Authorization: Bearer <jwt>
/// ```
///
/// On success the verified claims are turned into an `AuthContext` and the
/// request continues down the chain; on any failure the request is
/// short-circuited with 401.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::InvalidToken)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AppError::InvalidToken)?;

    let claims = auth_service::verify_token(&state.auth_keys, token)?;

    let auth_context = AuthContext {
        user_id: claims.sub,
        username: claims.username,
        role: claims.role,
        branch_id: claims.branch_id,
    };

    request.extensions_mut().insert(auth_context);

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(role: UserRole, branch_id: Option<Uuid>) -> AuthContext {
        AuthContext {
            user_id: Uuid::new_v4(),
            username: "test".to_string(),
            role,
            branch_id,
        }
    }

    #[test]
    fn director_passes_every_guard() {
        let ctx = context(UserRole::Director, None);
        assert!(ctx.require_director().is_ok());
        assert!(ctx.require_manager().is_ok());
        assert!(ctx.can_manage_branch(Uuid::new_v4()));
        assert_eq!(ctx.branch_scope(), None);
    }

    #[test]
    fn manager_is_scoped_to_own_branch() {
        let branch = Uuid::new_v4();
        let ctx = context(UserRole::BranchManager, Some(branch));

        assert!(matches!(ctx.require_director(), Err(AppError::Forbidden)));
        assert!(ctx.require_manager().is_ok());
        assert!(ctx.can_manage_branch(branch));
        assert!(!ctx.can_manage_branch(Uuid::new_v4()));
        assert_eq!(ctx.branch_scope(), Some(branch));
    }

    #[test]
    fn employee_cannot_manage() {
        let branch = Uuid::new_v4();
        let ctx = context(UserRole::Employee, Some(branch));

        assert!(matches!(ctx.require_manager(), Err(AppError::Forbidden)));
        assert!(!ctx.can_manage_branch(branch));
        assert_eq!(ctx.branch_scope(), Some(branch));
    }
}
