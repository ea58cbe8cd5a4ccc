//! Handlers for payment stages: planning, proof submission, verification,
//! and settlement-document download.

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use atelio_core::types::DbId;
use atelio_db::models::payment_stage::{PaymentStage, RejectProof, StageInput, SubmitProof};
use atelio_db::repositories::PaymentStageRepo;

use crate::engine::payments;
use crate::error::AppResult;
use crate::handlers::project;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/projects/{project_id}/stages
///
/// Admin-only: plan and create the payment stages for a project.
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(project_id): Path<DbId>,
    Json(inputs): Json<Vec<StageInput>>,
) -> AppResult<(StatusCode, Json<DataResponse<Vec<PaymentStage>>>)> {
    let stages = payments::create_stages(&state, project_id, &inputs).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: stages })))
}

/// GET /api/v1/projects/{project_id}/stages
pub async fn list(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<PaymentStage>>>> {
    let project = project::find_accessible(&state, &caller, project_id).await?;
    let stages = PaymentStageRepo::list_for_project(&state.pool, project.id).await?;
    Ok(Json(DataResponse { data: stages }))
}

/// POST /api/v1/stages/{id}/proof
///
/// Owning client submits proof of a bank transfer; the stage moves into
/// `pending_verification` for manual review.
pub async fn submit_proof(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<SubmitProof>,
) -> AppResult<Json<DataResponse<PaymentStage>>> {
    let stage = payments::submit_proof(&state, id, &caller, &input).await?;
    Ok(Json(DataResponse { data: stage }))
}

/// POST /api/v1/stages/{id}/approve
///
/// Admin-only: confirm the transfer arrived; the stage becomes `paid`.
pub async fn approve(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<PaymentStage>>> {
    let stage = payments::approve_stage(&state, id, admin.user_id).await?;
    Ok(Json(DataResponse { data: stage }))
}

/// POST /api/v1/stages/{id}/reject
///
/// Admin-only: reject the submitted proof; the stage returns to `available`.
pub async fn reject(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<RejectProof>,
) -> AppResult<Json<DataResponse<PaymentStage>>> {
    let stage = payments::reject_stage(&state, id, admin.user_id, &input.reason).await?;
    Ok(Json(DataResponse { data: stage }))
}

/// GET /api/v1/stages/{id}/invoice
///
/// Download the settlement document for a paid stage as a self-contained
/// HTML file with a deterministic file name.
pub async fn invoice(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Response> {
    let (invoice, file_name) = payments::settlement_document(&state, id, &caller).await?;
    let html = invoice.render_html();

    let response = (
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        html,
    )
        .into_response();
    Ok(response)
}
