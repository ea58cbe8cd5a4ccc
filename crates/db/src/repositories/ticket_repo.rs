//! Repository for the `tickets` and `ticket_responses` tables.

use sqlx::PgPool;

use atelio_core::types::DbId;

use crate::models::ticket::{CreateTicket, Ticket, TicketResponse};

const TICKET_COLUMNS: &str =
    "id, user_id, project_id, subject, body, status, created_at, updated_at";

const RESPONSE_COLUMNS: &str = "id, ticket_id, author_id, body, is_staff, created_at";

/// Provides storage for support tickets and their threaded responses.
pub struct TicketRepo;

impl TicketRepo {
    /// Open a new ticket for a user, returning the created row.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        input: &CreateTicket,
    ) -> Result<Ticket, sqlx::Error> {
        let query = format!(
            "INSERT INTO tickets (user_id, project_id, subject, body)
             VALUES ($1, $2, $3, $4)
             RETURNING {TICKET_COLUMNS}"
        );
        sqlx::query_as::<_, Ticket>(&query)
            .bind(user_id)
            .bind(input.project_id)
            .bind(&input.subject)
            .bind(&input.body)
            .fetch_one(pool)
            .await
    }

    /// Find a ticket by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Ticket>, sqlx::Error> {
        let query = format!("SELECT {TICKET_COLUMNS} FROM tickets WHERE id = $1");
        sqlx::query_as::<_, Ticket>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a user's own tickets, newest first.
    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Ticket>, sqlx::Error> {
        let query = format!(
            "SELECT {TICKET_COLUMNS} FROM tickets WHERE user_id = $1 ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Ticket>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// List every ticket (staff view), newest first.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Ticket>, sqlx::Error> {
        let query = format!("SELECT {TICKET_COLUMNS} FROM tickets ORDER BY created_at DESC");
        sqlx::query_as::<_, Ticket>(&query).fetch_all(pool).await
    }

    /// Append a response to a ticket, returning the created row.
    pub async fn add_response(
        pool: &PgPool,
        ticket_id: DbId,
        author_id: DbId,
        body: &str,
        is_staff: bool,
    ) -> Result<TicketResponse, sqlx::Error> {
        let query = format!(
            "INSERT INTO ticket_responses (ticket_id, author_id, body, is_staff)
             VALUES ($1, $2, $3, $4)
             RETURNING {RESPONSE_COLUMNS}"
        );
        sqlx::query_as::<_, TicketResponse>(&query)
            .bind(ticket_id)
            .bind(author_id)
            .bind(body)
            .bind(is_staff)
            .fetch_one(pool)
            .await
    }

    /// List a ticket's responses in thread order.
    pub async fn list_responses(
        pool: &PgPool,
        ticket_id: DbId,
    ) -> Result<Vec<TicketResponse>, sqlx::Error> {
        let query = format!(
            "SELECT {RESPONSE_COLUMNS} FROM ticket_responses \
             WHERE ticket_id = $1 ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, TicketResponse>(&query)
            .bind(ticket_id)
            .fetch_all(pool)
            .await
    }

    /// Set the ticket status (`open` / `closed`). Returns `true` if a row
    /// changed.
    pub async fn set_status(pool: &PgPool, id: DbId, status: &str) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE tickets SET status = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(status)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
