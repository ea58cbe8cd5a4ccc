//! Handlers for the caller's billing profile.

use axum::extract::State;
use axum::Json;

use atelio_core::error::CoreError;
use atelio_db::models::billing_profile::{BillingProfile, UpsertBillingProfile};
use atelio_db::repositories::BillingProfileRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/billing-profile
pub async fn get(
    State(state): State<AppState>,
    caller: AuthUser,
) -> AppResult<Json<DataResponse<BillingProfile>>> {
    let profile = BillingProfileRepo::find_by_user(&state.pool, caller.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Billing profile",
            id: caller.user_id,
        }))?;
    Ok(Json(DataResponse { data: profile }))
}

/// PUT /api/v1/billing-profile
///
/// Create or replace the caller's billing profile (one per user).
pub async fn put(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(input): Json<UpsertBillingProfile>,
) -> AppResult<Json<DataResponse<BillingProfile>>> {
    if input.company_name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Company name is required".into(),
        )));
    }
    let profile = BillingProfileRepo::upsert(&state.pool, caller.user_id, &input).await?;
    Ok(Json(DataResponse { data: profile }))
}
