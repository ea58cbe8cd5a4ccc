//! Handlers for the `/tickets` resource (support tickets and responses).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use atelio_core::error::CoreError;
use atelio_core::types::DbId;
use atelio_db::models::ticket::{CreateTicket, CreateTicketResponse, Ticket, TicketResponse};
use atelio_db::repositories::TicketRepo;
use atelio_events::DomainEvent;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// A ticket together with its response thread.
#[derive(Debug, Serialize)]
pub struct TicketDetail {
    #[serde(flatten)]
    pub ticket: Ticket,
    pub responses: Vec<TicketResponse>,
}

/// POST /api/v1/tickets
pub async fn create(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(input): Json<CreateTicket>,
) -> AppResult<(StatusCode, Json<DataResponse<Ticket>>)> {
    if input.subject.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Subject is required".into(),
        )));
    }

    let ticket = TicketRepo::create(&state.pool, caller.user_id, &input).await?;

    state.event_bus.publish(DomainEvent::TicketOpened {
        ticket_id: ticket.id,
        subject: ticket.subject.clone(),
        user_id: caller.user_id,
    });

    Ok((StatusCode::CREATED, Json(DataResponse { data: ticket })))
}

/// GET /api/v1/tickets
///
/// Staff see every ticket; clients see only their own.
pub async fn list(
    State(state): State<AppState>,
    caller: AuthUser,
) -> AppResult<Json<DataResponse<Vec<Ticket>>>> {
    let tickets = if caller.is_client() {
        TicketRepo::list_for_user(&state.pool, caller.user_id).await?
    } else {
        TicketRepo::list_all(&state.pool).await?
    };
    Ok(Json(DataResponse { data: tickets }))
}

/// GET /api/v1/tickets/{id}
///
/// Ticket plus its full response thread.
pub async fn get_by_id(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<TicketDetail>>> {
    let ticket = find_accessible(&state, &caller, id).await?;
    let responses = TicketRepo::list_responses(&state.pool, ticket.id).await?;
    Ok(Json(DataResponse {
        data: TicketDetail { ticket, responses },
    }))
}

/// POST /api/v1/tickets/{id}/responses
///
/// Append a response. Staff replies notify the owner; owner replies notify
/// the admins.
pub async fn respond(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<CreateTicketResponse>,
) -> AppResult<(StatusCode, Json<DataResponse<TicketResponse>>)> {
    let ticket = find_accessible(&state, &caller, id).await?;

    if input.body.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Response body is required".into(),
        )));
    }

    let by_staff = !caller.is_client();
    let response =
        TicketRepo::add_response(&state.pool, ticket.id, caller.user_id, &input.body, by_staff)
            .await?;

    state.event_bus.publish(DomainEvent::TicketReplied {
        ticket_id: ticket.id,
        subject: ticket.subject.clone(),
        user_id: ticket.user_id,
        by_staff,
    });

    Ok((StatusCode::CREATED, Json(DataResponse { data: response })))
}

/// POST /api/v1/tickets/{id}/close
pub async fn close(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Ticket>>> {
    let ticket = find_accessible(&state, &caller, id).await?;
    TicketRepo::set_status(&state.pool, ticket.id, "closed").await?;

    let closed = TicketRepo::find_by_id(&state.pool, ticket.id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Ticket",
            id,
        }))?;
    Ok(Json(DataResponse { data: closed }))
}

/// Load a ticket and enforce access: staff always, clients only their own.
async fn find_accessible(state: &AppState, caller: &AuthUser, id: DbId) -> AppResult<Ticket> {
    let ticket = TicketRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Ticket",
            id,
        }))?;

    if caller.is_client() {
        caller.ensure_self_or_admin(ticket.user_id)?;
    }
    Ok(ticket)
}
