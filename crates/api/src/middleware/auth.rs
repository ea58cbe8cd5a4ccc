//! The [`AuthUser`] extractor: token in, caller identity out.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use atelio_core::error::CoreError;
use atelio_core::roles::{ROLE_ADMIN, ROLE_CLIENT};
use atelio_core::types::DbId;

use crate::error::AppError;
use crate::state::AppState;

/// The authenticated caller, taken from the `Authorization: Bearer` header.
///
/// Any handler parameter of this type makes the route require a valid access
/// token; the role helpers cover the common authorization checks.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: DbId,
    /// `"admin"`, `"client"`, or `"partner"`.
    pub role: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }

    /// Clients are the non-staff role; partners and admins are staff.
    pub fn is_client(&self) -> bool {
        self.role == ROLE_CLIENT
    }

    /// Reject unless the caller is the given user or an admin.
    pub fn ensure_self_or_admin(&self, user_id: DbId) -> Result<(), AppError> {
        if self.user_id == user_id || self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Core(CoreError::Forbidden(
                "Not allowed to access this resource".into(),
            )))
        }
    }
}

fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let header = parts
        .headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Missing Authorization header".into(),
            ))
        })?;

    header.strip_prefix("Bearer ").ok_or_else(|| {
        AppError::Core(CoreError::Unauthorized(
            "Invalid Authorization format. Expected: Bearer <token>".into(),
        ))
    })
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;

        let claims = state.config.jwt.verify(token).map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        Ok(AuthUser {
            user_id: claims.sub,
            role: claims.role,
        })
    }
}
