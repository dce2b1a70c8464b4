//! Shared application state handed to every handler.

use crate::{cache::ListingCache, db::DbPool, services::auth_service::AuthKeys};
use std::sync::Arc;
use std::time::Duration;

/// Application state: database pool, listing cache, and token keys.
///
/// Cloning is cheap; the pool is internally reference-counted and the rest
/// sits behind `Arc`s.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub cache: Arc<ListingCache>,
    pub auth_keys: Arc<AuthKeys>,
}

impl AppState {
    pub fn new(pool: DbPool, jwt_secret: &str, cache_ttl: Duration) -> Self {
        Self {
            pool,
            cache: Arc::new(ListingCache::new(cache_ttl)),
            auth_keys: Arc::new(AuthKeys::from_secret(jwt_secret)),
        }
    }
}
