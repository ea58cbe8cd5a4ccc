//! Route definitions for the `/admin` resource (user management, notices).
//!
//! All endpoints require the `admin` role; enforcement lives in the
//! handlers via [`RequireAdmin`](crate::middleware::rbac::RequireAdmin).

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{admin, notification};
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// ```text
/// GET  /users                  -> list
/// POST /users                  -> create (any role)
/// POST /users/{id}/deactivate  -> deactivate + revoke sessions
/// POST /notifications          -> admin_notice (ad hoc notice to a user)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(admin::list).post(admin::create))
        .route("/users/{id}/deactivate", post(admin::deactivate))
        .route("/notifications", post(notification::admin_notice))
}
