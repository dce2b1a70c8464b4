//! Application configuration management.
//!
//! Configuration is loaded from environment variables with the `envy` crate,
//! which deserializes them into a type-safe struct.

use serde::Deserialize;

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `DATABASE_URL` (required): PostgreSQL connection string
/// - `JWT_SECRET` (required): HMAC secret for signing session tokens
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 3000
/// - `BOOTSTRAP_PASSWORD` (optional): password given to the director account
///   created on an empty database, defaults to `change-me`
/// - `CACHE_TTL_SECS` (optional): lifetime of cached listings, defaults to 60
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,

    pub jwt_secret: String,

    #[serde(default = "default_port")]
    pub server_port: u16,

    #[serde(default = "default_bootstrap_password")]
    pub bootstrap_password: String,

    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

fn default_port() -> u16 {
    3000
}

fn default_bootstrap_password() -> String {
    "change-me".to_string()
}

fn default_cache_ttl_secs() -> u64 {
    60
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file is read first if present (and silently skipped if not),
    /// then the environment is deserialized into a Config struct.
    ///
    /// # Errors
    ///
    /// Returns an error if required variables are missing or a value cannot
    /// be parsed into the expected type.
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();

        // Field names map directly: database_url -> DATABASE_URL
        envy::from_env::<Config>()
    }
}
