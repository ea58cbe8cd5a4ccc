//! Support ticket models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use atelio_core::types::{DbId, Timestamp};

/// A row from the `tickets` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Ticket {
    pub id: DbId,
    pub user_id: DbId,
    pub project_id: Option<DbId>,
    pub subject: String,
    pub body: String,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `ticket_responses` table, ordered by creation time.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TicketResponse {
    pub id: DbId,
    pub ticket_id: DbId,
    pub author_id: DbId,
    pub body: String,
    pub is_staff: bool,
    pub created_at: Timestamp,
}

/// DTO for opening a ticket.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTicket {
    pub subject: String,
    pub body: String,
    pub project_id: Option<DbId>,
}

/// DTO for replying to a ticket.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTicketResponse {
    pub body: String,
}
