//! Notification models.
//!
//! Notifications are rows the client polls for: an incoming transfer for a
//! branch, a fund allocation landing, a cancellation. They target a branch
//! and optionally a specific user within it.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Represents a notification record from the database.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Notification {
    pub id: Uuid,

    /// Branch whose staff should see this
    pub branch_id: Uuid,

    /// Specific addressee, or NULL for the whole branch
    pub user_id: Option<Uuid>,

    pub message: String,

    pub is_read: bool,

    pub created_at: DateTime<Utc>,
}
