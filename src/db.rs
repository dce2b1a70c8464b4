//! Database connection pool, migrations, and first-run bootstrap.

use crate::{error::AppError, services::auth_service};
use sqlx::{Pool, Postgres};

/// Type alias for the PostgreSQL connection pool.
pub type DbPool = Pool<Postgres>;

/// Create a new PostgreSQL connection pool.
///
/// The pool keeps a small number of connections alive and hands them out
/// per request, which is far cheaper than connecting per request.
///
/// # Errors
///
/// Returns an error if the connection string is invalid or the server is
/// unreachable.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
}

/// Run database migrations from the `migrations/` directory.
///
/// Applied migrations are tracked in `_sqlx_migrations`, so each file runs
/// only once. The macro embeds the SQL at compile time.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Create the initial director account when the users table is empty.
///
/// A fresh database has no users and therefore no way to log in. This seeds
/// a `director` account with the configured bootstrap password so the first
/// operator can sign in and create branches and staff.
///
/// Does nothing when any user already exists.
pub async fn bootstrap_director(pool: &DbPool, password: &str) -> Result<(), AppError> {
    let user_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;

    if user_count > 0 {
        return Ok(());
    }

    let password_hash = auth_service::hash_password(password)?;

    sqlx::query(
        r#"
        INSERT INTO users (username, password_hash, full_name, role)
        VALUES ('director', $1, 'Director', 'director')
        "#,
    )
    .bind(password_hash)
    .execute(pool)
    .await?;

    tracing::warn!("created bootstrap director account; change its password");

    Ok(())
}
