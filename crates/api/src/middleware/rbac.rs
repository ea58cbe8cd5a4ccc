//! Role gates as extractors.
//!
//! Putting the role requirement in the handler signature keeps authorization
//! visible at the route definition and impossible to forget.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use atelio_core::error::CoreError;
use atelio_core::roles::{ROLE_ADMIN, ROLE_PARTNER};

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

fn require_role(user: &AuthUser, allowed: &[&str], denial: &str) -> Result<(), AppError> {
    if allowed.contains(&user.role.as_str()) {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::Forbidden(denial.to_string())))
    }
}

/// Admin only; anything else is a 403.
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        require_role(&user, &[ROLE_ADMIN], "Admin role required")?;
        Ok(RequireAdmin(user))
    }
}

/// Staff gate: partners and admins pass, clients get a 403.
pub struct RequireStaff(pub AuthUser);

impl FromRequestParts<AppState> for RequireStaff {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        require_role(
            &user,
            &[ROLE_ADMIN, ROLE_PARTNER],
            "Partner or Admin role required",
        )?;
        Ok(RequireStaff(user))
    }
}

/// Any authenticated user. Same as extracting [`AuthUser`] directly, but the
/// name spells out the intent in route definitions.
pub struct RequireAuth(pub AuthUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        Ok(RequireAuth(user))
    }
}
