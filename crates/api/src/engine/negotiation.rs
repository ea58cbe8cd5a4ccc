//! Budget-negotiation flows: propose, accept, reject, counter.
//!
//! The chain is append-only; responding never edits history. Acceptance is
//! the only path that changes the project price, and it happens in the same
//! transaction as the negotiation update (see `NegotiationRepo`).

use atelio_core::error::CoreError;
use atelio_core::negotiation;
use atelio_core::status::NegotiationStatus;
use atelio_core::types::DbId;
use atelio_db::models::negotiation::{BudgetNegotiation, CreateNegotiation, NegotiationResponse};
use atelio_db::models::project::Project;
use atelio_db::repositories::{NegotiationRepo, ProjectRepo};
use atelio_events::DomainEvent;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Open a new negotiation on a project.
///
/// The project's current price is captured as `original_price` so the offer
/// stays meaningful even after later accepted negotiations move the price.
pub async fn propose(
    state: &AppState,
    project_id: DbId,
    caller: &AuthUser,
    input: &CreateNegotiation,
) -> AppResult<BudgetNegotiation> {
    let project = find_project(state, project_id).await?;
    caller.ensure_self_or_admin(project.client_id)?;

    negotiation::validate_proposed_price(input.proposed_price)?;

    let created = NegotiationRepo::create(
        &state.pool,
        project_id,
        caller.user_id,
        project.price,
        input.proposed_price,
        input.message.as_deref(),
    )
    .await?;

    state.event_bus.publish(DomainEvent::NegotiationProposed {
        negotiation_id: created.id,
        project_id,
        project_name: project.name,
        proposed_price: created.proposed_price,
        client_id: project.client_id,
        by_client: caller.is_client(),
    });

    Ok(created)
}

/// Respond to a pending negotiation: accept, reject, or counter.
///
/// Each response path runs a conditional update keyed on `pending`; a
/// concurrent response makes the loser's update match nothing, which is
/// reported as an invalid-state error rather than applied twice.
pub async fn respond(
    state: &AppState,
    negotiation_id: DbId,
    caller: &AuthUser,
    response: &NegotiationResponse,
) -> AppResult<BudgetNegotiation> {
    let current = NegotiationRepo::find_by_id(&state.pool, negotiation_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Negotiation",
            id: negotiation_id,
        }))?;

    let project = find_project(state, current.project_id).await?;
    caller.ensure_self_or_admin(project.client_id)?;

    // Early guard for a clean error message; the repository re-checks
    // atomically.
    negotiation::ensure_pending(NegotiationStatus::parse(&current.status)?)?;

    match response {
        NegotiationResponse::Accept => {
            let (accepted, project) =
                NegotiationRepo::accept(&state.pool, negotiation_id, caller.user_id)
                    .await?
                    .ok_or_else(already_responded)?;

            state.event_bus.publish(DomainEvent::NegotiationAccepted {
                negotiation_id,
                project_name: project.name,
                accepted_price: accepted.proposed_price,
                client_id: project.client_id,
                by_client: caller.is_client(),
            });
            Ok(accepted)
        }

        NegotiationResponse::Reject => {
            let rejected = NegotiationRepo::reject(&state.pool, negotiation_id, caller.user_id)
                .await?
                .ok_or_else(already_responded)?;

            state.event_bus.publish(DomainEvent::NegotiationRejected {
                negotiation_id,
                project_name: project.name,
                client_id: project.client_id,
                by_client: caller.is_client(),
            });
            Ok(rejected)
        }

        NegotiationResponse::Counter {
            proposed_price,
            message,
        } => {
            negotiation::validate_proposed_price(*proposed_price)?;

            let (_, new_row) = NegotiationRepo::counter(
                &state.pool,
                negotiation_id,
                caller.user_id,
                *proposed_price,
                message.as_deref(),
            )
            .await?
            .ok_or_else(already_responded)?;

            state.event_bus.publish(DomainEvent::NegotiationCountered {
                negotiation_id,
                new_negotiation_id: new_row.id,
                project_name: project.name,
                proposed_price: *proposed_price,
                client_id: project.client_id,
                by_client: caller.is_client(),
            });
            Ok(new_row)
        }
    }
}

fn already_responded() -> AppError {
    AppError::Core(CoreError::InvalidState(
        "Negotiation has already been responded to".into(),
    ))
}

async fn find_project(state: &AppState, project_id: DbId) -> AppResult<Project> {
    ProjectRepo::find_by_id(&state.pool, project_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id: project_id,
        }))
}
