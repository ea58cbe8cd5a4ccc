//! Handlers for budget negotiations.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use atelio_core::types::DbId;
use atelio_db::models::negotiation::{BudgetNegotiation, CreateNegotiation, NegotiationResponse};
use atelio_db::repositories::NegotiationRepo;

use crate::engine::negotiation;
use crate::error::AppResult;
use crate::handlers::project;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/projects/{project_id}/negotiations
///
/// Open a negotiation on a project. Clients negotiate their own projects;
/// admins may open a counter-direction offer on any project.
pub async fn create(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(project_id): Path<DbId>,
    Json(input): Json<CreateNegotiation>,
) -> AppResult<(StatusCode, Json<DataResponse<BudgetNegotiation>>)> {
    let created = negotiation::propose(&state, project_id, &caller, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: created })))
}

/// GET /api/v1/projects/{project_id}/negotiations
///
/// The full negotiation chain for a project, oldest first.
pub async fn list(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<BudgetNegotiation>>>> {
    let project = project::find_accessible(&state, &caller, project_id).await?;
    let chain = NegotiationRepo::list_for_project(&state.pool, project.id).await?;
    Ok(Json(DataResponse { data: chain }))
}

/// POST /api/v1/negotiations/{id}/respond
///
/// Accept, reject, or counter a pending negotiation. A counter appends a
/// new pending row and returns it.
pub async fn respond(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<DbId>,
    Json(response): Json<NegotiationResponse>,
) -> AppResult<Json<DataResponse<BudgetNegotiation>>> {
    let result = negotiation::respond(&state, id, &caller, &response).await?;
    Ok(Json(DataResponse { data: result }))
}
