//! Handlers for the `/auth` resource (register, login, refresh, logout).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use atelio_core::error::CoreError;
use atelio_core::roles::ROLE_CLIENT;
use atelio_core::types::DbId;
use atelio_db::models::user::CreateUser;
use atelio_db::repositories::{SessionRepo, UserRepo};

use crate::auth::jwt::{new_refresh_token, refresh_token_digest};
use crate::auth::password::{hash_password, validate_password_strength, verify_password};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Consecutive failed logins tolerated before the account locks.
const MAX_FAILED_ATTEMPTS: i32 = 5;

/// How long a locked account stays locked, in minutes.
const LOCK_DURATION_MINS: i64 = 15;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

/// Body of `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Body of `POST /auth/refresh`.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Successful authentication response returned by register, login, and refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserInfo,
}

/// The caller-visible slice of the user row, embedded in [`AuthResponse`].
#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: DbId,
    pub email: String,
    pub full_name: String,
    pub role: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/register
///
/// Client self-signup. New accounts always get the `client` role; staff
/// accounts are created through the admin endpoints.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let email = input.email.trim().to_lowercase();
    if !email.contains('@') {
        return Err(AppError::Core(CoreError::Validation(
            "A valid email address is required".into(),
        )));
    }
    validate_password_strength(&input.password)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    if input.full_name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Full name is required".into(),
        )));
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    // Duplicate email surfaces as a 409 via the uq_users_email constraint.
    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            email,
            password_hash,
            full_name: input.full_name.trim().to_string(),
            role: ROLE_CLIENT.to_string(),
        },
    )
    .await?;

    let response =
        issue_session(&state, user.id, &user.email, &user.full_name, &user.role).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/v1/auth/login
///
/// Authenticate with email + password. Returns access and refresh tokens.
///
/// Wrong email and wrong password produce the same 401 message; repeated
/// failures lock the account for a cool-down window.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let user = UserRepo::find_by_email(&state.pool, &input.email.trim().to_lowercase())
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized("Invalid email or password".into()))
        })?;

    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    if let Some(locked_until) = user.locked_until {
        if locked_until > Utc::now() {
            return Err(AppError::Core(CoreError::Forbidden(
                "Account is temporarily locked. Try again later.".into(),
            )));
        }
    }

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;

    if !password_valid {
        note_failed_attempt(&state, user.id, user.failed_login_count).await?;
        return Err(AppError::Core(CoreError::Unauthorized(
            "Invalid email or password".into(),
        )));
    }

    // Resets the failure counter and stamps last_login_at.
    UserRepo::record_successful_login(&state.pool, user.id).await?;

    let response =
        issue_session(&state, user.id, &user.email, &user.full_name, &user.role).await?;

    Ok(Json(response))
}

/// Bump the failure counter and lock the account once it crosses the
/// threshold.
async fn note_failed_attempt(
    state: &AppState,
    user_id: DbId,
    previous_failures: i32,
) -> AppResult<()> {
    UserRepo::increment_failed_login(&state.pool, user_id).await?;

    if previous_failures + 1 >= MAX_FAILED_ATTEMPTS {
        let lock_until = Utc::now() + chrono::Duration::minutes(LOCK_DURATION_MINS);
        UserRepo::lock_account(&state.pool, user_id, lock_until).await?;
    }
    Ok(())
}

/// POST /api/v1/auth/refresh
///
/// Exchange a valid refresh token for new access + refresh tokens. Tokens
/// rotate: the presented session is revoked before a new one is minted, so
/// a stolen refresh token stops working the moment its owner uses it.
pub async fn refresh(
    State(state): State<AppState>,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    let token_hash = refresh_token_digest(&input.refresh_token);

    let session = SessionRepo::find_by_refresh_token_hash(&state.pool, &token_hash)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid or expired refresh token".into(),
            ))
        })?;

    SessionRepo::revoke(&state.pool, session.id).await?;

    let user = UserRepo::find_by_id(&state.pool, session.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;

    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    let response =
        issue_session(&state, user.id, &user.email, &user.full_name, &user.role).await?;

    Ok(Json(response))
}

/// POST /api/v1/auth/logout
///
/// Revokes every session of the caller, everywhere. Returns 204.
pub async fn logout(State(state): State<AppState>, auth_user: AuthUser) -> AppResult<StatusCode> {
    SessionRepo::revoke_all_for_user(&state.pool, auth_user.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Mint both tokens, persist the session row, and assemble the response body.
async fn issue_session(
    state: &AppState,
    user_id: DbId,
    email: &str,
    full_name: &str,
    role: &str,
) -> AppResult<AuthResponse> {
    let access_token = state
        .config
        .jwt
        .issue(user_id, role)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    let (refresh_plaintext, refresh_hash) = new_refresh_token();

    let expires_at = Utc::now() + chrono::Duration::days(state.config.jwt.refresh_ttl_days);
    SessionRepo::create(&state.pool, user_id, &refresh_hash, expires_at).await?;

    let expires_in = state.config.jwt.access_ttl_mins * 60;

    Ok(AuthResponse {
        access_token,
        refresh_token: refresh_plaintext,
        expires_in,
        user: UserInfo {
            id: user_id,
            email: email.to_string(),
            full_name: full_name.to_string(),
            role: role.to_string(),
        },
    })
}
