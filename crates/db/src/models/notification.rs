//! Notification entity model.

use serde::Serialize;
use sqlx::FromRow;

use atelio_core::types::{DbId, Timestamp};

/// A row from the `notifications` table.
///
/// Created only by the fan-out service (or an admin notice); mutated only
/// by mark-read; never deleted.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Notification {
    pub id: DbId,
    pub user_id: DbId,
    pub title: String,
    pub message: String,
    pub kind: String,
    pub is_read: bool,
    pub read_at: Option<Timestamp>,
    pub created_at: Timestamp,
}
