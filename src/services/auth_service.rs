//! Authentication service: password hashing, session tokens, login, and
//! password changes.
//!
//! Passwords are hashed with Argon2 (salted per-hash). Sessions are stateless
//! JWTs signed with an HMAC secret from configuration; the claims carry the
//! user's id, role, and branch so the authorization middleware can gate
//! requests without a database lookup per request.

use crate::{
    db::DbPool,
    error::AppError,
    models::{
        types::UserRole,
        user::{ChangePasswordRequest, LoginRequest, LoginResponse, User},
    },
};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Session lifetime. The desktop client re-logs in each morning anyway.
const TOKEN_LIFETIME_HOURS: i64 = 24;

/// Signing and verification keys derived from the configured secret.
pub struct AuthKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl AuthKeys {
    pub fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

/// JWT claims carried by every session token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: Uuid,
    pub username: String,
    pub role: UserRole,
    pub branch_id: Option<Uuid>,
    /// Expiry as a unix timestamp
    pub exp: i64,
}

/// Hash a password with Argon2 and a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|_| AppError::Internal)
}

/// Verify a password against a stored Argon2 hash.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let parsed = PasswordHash::new(password_hash).map_err(|_| AppError::Internal)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Mint a session token for a user.
pub fn create_token(keys: &AuthKeys, user: &User) -> Result<String, AppError> {
    let exp = Utc::now() + Duration::hours(TOKEN_LIFETIME_HOURS);
    let claims = Claims {
        sub: user.id,
        username: user.username.clone(),
        role: user.role,
        branch_id: user.branch_id,
        exp: exp.timestamp(),
    };
    encode(&Header::default(), &claims, &keys.encoding).map_err(|_| AppError::Internal)
}

/// Verify a token and return its claims.
///
/// Expiry is checked by the library; any failure (signature, structure,
/// expiry) collapses to `InvalidToken`.
pub fn verify_token(keys: &AuthKeys, token: &str) -> Result<Claims, AppError> {
    decode::<Claims>(token, &keys.decoding, &Validation::default())
        .map(|data| data.claims)
        .map_err(|_| AppError::InvalidToken)
}

/// Authenticate a username/password pair and mint a session token.
///
/// Inactive users are treated exactly like unknown ones so the response
/// never reveals whether an account exists.
pub async fn login(
    pool: &DbPool,
    keys: &AuthKeys,
    request: LoginRequest,
) -> Result<LoginResponse, AppError> {
    let user = sqlx::query_as::<_, User>(
        "SELECT * FROM users WHERE username = $1 AND is_active = true",
    )
    .bind(&request.username)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::InvalidCredentials)?;

    if !verify_password(&request.password, &user.password_hash)? {
        return Err(AppError::InvalidCredentials);
    }

    let token = create_token(keys, &user)?;

    tracing::info!(username = %user.username, "user logged in");

    Ok(LoginResponse {
        token,
        user: user.into(),
    })
}

/// Change the calling user's password after re-verifying the current one.
pub async fn change_password(
    pool: &DbPool,
    user_id: Uuid,
    request: ChangePasswordRequest,
) -> Result<(), AppError> {
    if request.new_password.len() < 8 {
        return Err(AppError::InvalidRequest(
            "New password must be at least 8 characters".to_string(),
        ));
    }

    let current_hash: String = sqlx::query_scalar(
        "SELECT password_hash FROM users WHERE id = $1 AND is_active = true",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::UserNotFound)?;

    if !verify_password(&request.current_password, &current_hash)? {
        return Err(AppError::InvalidCredentials);
    }

    let new_hash = hash_password(&request.new_password)?;

    sqlx::query("UPDATE users SET password_hash = $1, updated_at = NOW() WHERE id = $2")
        .bind(new_hash)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            username: "a.haddad".to_string(),
            password_hash: String::new(),
            full_name: "Amin Haddad".to_string(),
            role: UserRole::Employee,
            branch_id: Some(Uuid::new_v4()),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn password_hash_verifies_and_rejects() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("wrong horse", &hash).unwrap());
    }

    #[test]
    fn token_round_trip_preserves_claims() {
        let keys = AuthKeys::from_secret("test-secret");
        let user = sample_user();

        let token = create_token(&keys, &user).unwrap();
        let claims = verify_token(&keys, &token).unwrap();

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.username, user.username);
        assert_eq!(claims.role, UserRole::Employee);
        assert_eq!(claims.branch_id, user.branch_id);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let keys = AuthKeys::from_secret("secret-a");
        let other = AuthKeys::from_secret("secret-b");
        let token = create_token(&keys, &sample_user()).unwrap();

        assert!(matches!(
            verify_token(&other, &token),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn garbage_token_is_rejected() {
        let keys = AuthKeys::from_secret("test-secret");
        assert!(matches!(
            verify_token(&keys, "not-a-token"),
            Err(AppError::InvalidToken)
        ));
    }
}
