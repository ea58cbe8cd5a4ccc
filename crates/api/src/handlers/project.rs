//! Handlers for the `/projects` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use atelio_core::error::CoreError;
use atelio_core::status::ProjectStatus;
use atelio_core::types::DbId;
use atelio_db::models::project::{CreateProject, Project, UpdateProject};
use atelio_db::models::timeline::TimelineEntry;
use atelio_db::repositories::{PaymentStageRepo, ProjectRepo, TimelineRepo};
use atelio_events::DomainEvent;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/projects
///
/// Clients create projects for themselves; admins may create on a client's
/// behalf by passing `client_id`.
pub async fn create(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(input): Json<CreateProject>,
) -> AppResult<(StatusCode, Json<DataResponse<Project>>)> {
    let client_id = match (caller.is_admin(), input.client_id) {
        (true, Some(client_id)) => client_id,
        (true, None) => {
            return Err(AppError::Core(CoreError::Validation(
                "client_id is required when an admin creates a project".into(),
            )))
        }
        (false, _) if !caller.is_client() => {
            return Err(AppError::Core(CoreError::Forbidden(
                "Only clients and admins may create projects".into(),
            )))
        }
        (false, _) => caller.user_id,
    };

    if input.name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Project name is required".into(),
        )));
    }

    let project = ProjectRepo::create(
        &state.pool,
        client_id,
        input.name.trim(),
        input.description.as_deref(),
        input.price,
    )
    .await?;

    state.event_bus.publish(DomainEvent::ProjectCreated {
        project_id: project.id,
        project_name: project.name.clone(),
        client_id,
        by_admin: caller.is_admin(),
    });

    Ok((StatusCode::CREATED, Json(DataResponse { data: project })))
}

/// GET /api/v1/projects
///
/// Staff see every project; clients see only their own.
pub async fn list(
    State(state): State<AppState>,
    caller: AuthUser,
) -> AppResult<Json<DataResponse<Vec<Project>>>> {
    let projects = if caller.is_client() {
        ProjectRepo::list_for_client(&state.pool, caller.user_id).await?
    } else {
        ProjectRepo::list(&state.pool).await?
    };
    Ok(Json(DataResponse { data: projects }))
}

/// GET /api/v1/projects/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Project>>> {
    let project = find_accessible(&state, &caller, id).await?;
    Ok(Json(DataResponse { data: project }))
}

/// PUT /api/v1/projects/{id}
///
/// Admin-only: updates description, status, and progress. Raising progress
/// unlocks any payment stages whose gate is now crossed.
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProject>,
) -> AppResult<Json<DataResponse<Project>>> {
    if let Some(status) = &input.status {
        ProjectStatus::parse(status)?;
    }
    if let Some(progress) = input.progress {
        if !(0..=100).contains(&progress) {
            return Err(AppError::Core(CoreError::Validation(
                "Progress must be between 0 and 100".into(),
            )));
        }
    }

    let project = ProjectRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;

    if input.progress.is_some() {
        let unlocked =
            PaymentStageRepo::promote_unlocked(&state.pool, project.id, project.progress).await?;
        for stage in unlocked {
            state.event_bus.publish(DomainEvent::StageAvailable {
                stage_id: stage.id,
                project_id: project.id,
                project_name: project.name.clone(),
                stage_name: stage.name,
                amount: stage.amount,
                client_id: project.client_id,
            });
        }
    }

    state.event_bus.publish(DomainEvent::ProjectUpdated {
        project_id: project.id,
        project_name: project.name.clone(),
        client_id: project.client_id,
        status: ProjectStatus::parse(&project.status)?,
        progress: project.progress,
    });

    Ok(Json(DataResponse { data: project }))
}

/// GET /api/v1/projects/{id}/timeline
pub async fn timeline(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<TimelineEntry>>>> {
    let project = find_accessible(&state, &caller, id).await?;
    let entries = TimelineRepo::list_for_project(&state.pool, project.id).await?;
    Ok(Json(DataResponse { data: entries }))
}

/// Load a project and enforce that the caller may see it: staff always,
/// clients only their own.
pub async fn find_accessible(
    state: &AppState,
    caller: &AuthUser,
    project_id: DbId,
) -> AppResult<Project> {
    let project = ProjectRepo::find_by_id(&state.pool, project_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id: project_id,
        }))?;

    if caller.is_client() {
        caller.ensure_self_or_admin(project.client_id)?;
    }
    Ok(project)
}
