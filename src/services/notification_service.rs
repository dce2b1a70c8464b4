//! Notification service.
//!
//! Other services write notification rows as part of their own database
//! transactions (so a rolled-back transfer never leaves a stray "incoming
//! transfer" message); this module also serves the polling endpoints.

use crate::{db::DbPool, error::AppError, models::notification::Notification};
use sqlx::PgConnection;
use uuid::Uuid;

/// Insert a notification inside an open database transaction.
///
/// `user_id` narrows the addressee; `None` targets the whole branch.
pub(crate) async fn notify_branch(
    conn: &mut PgConnection,
    branch_id: Uuid,
    user_id: Option<Uuid>,
    message: String,
) -> Result<(), AppError> {
    sqlx::query("INSERT INTO notifications (branch_id, user_id, message) VALUES ($1, $2, $3)")
        .bind(branch_id)
        .bind(user_id)
        .bind(message)
        .execute(conn)
        .await?;

    Ok(())
}

/// List notifications for a branch, unread first, newest first.
///
/// `branch_id` of `None` (a director) lists across all branches.
pub async fn list_notifications(
    pool: &DbPool,
    branch_id: Option<Uuid>,
) -> Result<Vec<Notification>, AppError> {
    let notifications = match branch_id {
        Some(branch_id) => {
            sqlx::query_as::<_, Notification>(
                "SELECT * FROM notifications
                 WHERE branch_id = $1
                 ORDER BY is_read ASC, created_at DESC
                 LIMIT 200",
            )
            .bind(branch_id)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, Notification>(
                "SELECT * FROM notifications ORDER BY is_read ASC, created_at DESC LIMIT 200",
            )
            .fetch_all(pool)
            .await?
        }
    };

    Ok(notifications)
}

/// Mark one notification as read.
///
/// `branch_id` scopes the update so staff cannot touch another branch's
/// notifications; `None` (director) skips the scope check.
pub async fn mark_read(
    pool: &DbPool,
    notification_id: Uuid,
    branch_id: Option<Uuid>,
) -> Result<Notification, AppError> {
    let notification = match branch_id {
        Some(branch_id) => {
            sqlx::query_as::<_, Notification>(
                "UPDATE notifications SET is_read = true WHERE id = $1 AND branch_id = $2 RETURNING *",
            )
            .bind(notification_id)
            .bind(branch_id)
            .fetch_optional(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, Notification>(
                "UPDATE notifications SET is_read = true WHERE id = $1 RETURNING *",
            )
            .bind(notification_id)
            .fetch_optional(pool)
            .await?
        }
    };

    notification.ok_or(AppError::NotificationNotFound)
}
