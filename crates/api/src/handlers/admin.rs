//! Handlers for admin user management.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use atelio_core::error::CoreError;
use atelio_core::roles::{ROLE_ADMIN, ROLE_CLIENT, ROLE_PARTNER};
use atelio_core::types::DbId;
use atelio_db::models::user::{CreateUser, User};
use atelio_db::repositories::{SessionRepo, UserRepo};

use crate::auth::password::{hash_password, validate_password_strength};
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /admin/users`.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub role: String,
}

/// GET /api/v1/admin/users
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<User>>>> {
    let users = UserRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: users }))
}

/// POST /api/v1/admin/users
///
/// Create an account with any role; this is the only path that creates
/// staff accounts.
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(input): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<User>>)> {
    if ![ROLE_ADMIN, ROLE_CLIENT, ROLE_PARTNER].contains(&input.role.as_str()) {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Unknown role: {}",
            input.role
        ))));
    }
    let email = input.email.trim().to_lowercase();
    if !email.contains('@') {
        return Err(AppError::Core(CoreError::Validation(
            "A valid email address is required".into(),
        )));
    }
    validate_password_strength(&input.password)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            email,
            password_hash,
            full_name: input.full_name.trim().to_string(),
            role: input.role,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: user })))
}

/// POST /api/v1/admin/users/{id}/deactivate
///
/// Deactivate an account and revoke all of its sessions.
pub async fn deactivate(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if id == admin.user_id {
        return Err(AppError::Core(CoreError::Validation(
            "Admins cannot deactivate their own account".into(),
        )));
    }

    let updated = UserRepo::set_active(&state.pool, id, false).await?;
    if !updated {
        return Err(AppError::Core(CoreError::NotFound { entity: "User", id }));
    }

    SessionRepo::revoke_all_for_user(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
