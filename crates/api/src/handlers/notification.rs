//! Handlers for the `/notifications` resource and admin-authored notices.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use atelio_core::error::CoreError;
use atelio_core::status::NotificationKind;
use atelio_core::types::DbId;
use atelio_db::models::notification::Notification;
use atelio_db::repositories::{NotificationRepo, UserRepo};
use atelio_events::DomainEvent;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Default page size for notification listings.
const DEFAULT_LIMIT: i64 = 50;

/// Query parameters for `GET /notifications`.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub unread_only: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Request body for `POST /admin/notifications`.
#[derive(Debug, Deserialize)]
pub struct AdminNoticeRequest {
    pub user_id: DbId,
    pub title: String,
    pub message: String,
    #[serde(default = "default_kind")]
    pub kind: NotificationKind,
}

fn default_kind() -> NotificationKind {
    NotificationKind::Info
}

/// GET /api/v1/notifications
pub async fn list(
    State(state): State<AppState>,
    caller: AuthUser,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<DataResponse<Vec<Notification>>>> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, 200);
    let offset = query.offset.unwrap_or(0).max(0);

    let notifications = NotificationRepo::list_for_user(
        &state.pool,
        caller.user_id,
        query.unread_only,
        limit,
        offset,
    )
    .await?;
    Ok(Json(DataResponse {
        data: notifications,
    }))
}

/// POST /api/v1/notifications/{id}/read
///
/// Idempotent: re-marking a read notification still returns 204. 404 is
/// reserved for an id that does not exist or belongs to someone else.
pub async fn mark_read(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let updated = NotificationRepo::mark_read(&state.pool, id, caller.user_id).await?;
    if updated {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Notification",
            id,
        }))
    }
}

/// POST /api/v1/notifications/read-all
pub async fn mark_all_read(
    State(state): State<AppState>,
    caller: AuthUser,
) -> AppResult<Json<serde_json::Value>> {
    let count = NotificationRepo::mark_all_read(&state.pool, caller.user_id).await?;
    Ok(Json(serde_json::json!({ "marked_read": count })))
}

/// GET /api/v1/notifications/unread-count
pub async fn unread_count(
    State(state): State<AppState>,
    caller: AuthUser,
) -> AppResult<Json<serde_json::Value>> {
    let count = NotificationRepo::unread_count(&state.pool, caller.user_id).await?;
    Ok(Json(serde_json::json!({ "unread": count })))
}

/// POST /api/v1/admin/notifications
///
/// Admin-authored ad hoc notice to a single user; delivered through the
/// same fan-out as every other event (DB row, WebSocket push, email).
pub async fn admin_notice(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(input): Json<AdminNoticeRequest>,
) -> AppResult<StatusCode> {
    if input.title.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Title is required".into(),
        )));
    }

    // Fail fast on an unknown recipient instead of dropping the notice in
    // the fan-out.
    UserRepo::find_by_id(&state.pool, input.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: input.user_id,
        }))?;

    state.event_bus.publish(DomainEvent::AdminNotice {
        user_id: input.user_id,
        title: input.title,
        message: input.message,
        kind: input.kind,
    });

    Ok(StatusCode::ACCEPTED)
}
