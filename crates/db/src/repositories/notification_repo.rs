//! Repository for the `notifications` table.
//!
//! Rows are written by the notification fan-out and by admin notices; the
//! read/unread flags belong to the owning user, so every mutation here is
//! scoped by `user_id`.

use sqlx::PgPool;

use atelio_core::types::DbId;

use crate::models::notification::Notification;

const COLUMNS: &str = "id, user_id, title, message, kind, is_read, read_at, created_at";

pub struct NotificationRepo;

impl NotificationRepo {
    /// Insert a notification row, returning its id.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        title: &str,
        message: &str,
        kind: &str,
    ) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO notifications (user_id, title, message, kind) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id",
        )
        .bind(user_id)
        .bind(title)
        .bind(message)
        .bind(kind)
        .fetch_one(pool)
        .await
    }

    /// Page through a user's notifications, newest first, optionally
    /// restricted to unread ones.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Notification>, sqlx::Error> {
        let unread_filter = if unread_only { "AND is_read = false" } else { "" };
        let sql = format!(
            "SELECT {COLUMNS} FROM notifications \
             WHERE user_id = $1 {unread_filter} \
             ORDER BY created_at DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as(&sql)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Flag one notification as read. Re-marking an already-read row is a
    /// no-op that keeps the original `read_at`; `false` means no
    /// notification with that id belongs to the user.
    pub async fn mark_read(
        pool: &PgPool,
        notification_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = true, read_at = COALESCE(read_at, NOW()) \
             WHERE id = $1 AND user_id = $2",
        )
        .bind(notification_id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Flag everything unread as read, returning how many rows changed.
    pub async fn mark_all_read(pool: &PgPool, user_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = true, read_at = NOW() \
             WHERE user_id = $1 AND is_read = false",
        )
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// How many unread notifications the user has.
    pub async fn unread_count(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND is_read = false",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await
    }
}
