//! Project timeline entry model.

use serde::Serialize;
use sqlx::FromRow;

use atelio_core::types::{DbId, Timestamp};

/// A row from the `project_timeline` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TimelineEntry {
    pub id: DbId,
    pub project_id: DbId,
    pub position: i32,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
}
