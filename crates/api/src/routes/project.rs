//! Route definitions for the `/projects` resource and its sub-resources.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{negotiation, payment_stage, project};
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET  /                               -> list (own for clients, all for staff)
/// POST /                               -> create
/// GET  /{id}                           -> get_by_id
/// PUT  /{id}                           -> update (admin only)
/// GET  /{id}/timeline                  -> timeline
/// GET  /{project_id}/stages            -> payment_stage::list
/// POST /{project_id}/stages            -> payment_stage::create (admin only)
/// GET  /{project_id}/negotiations      -> negotiation::list
/// POST /{project_id}/negotiations      -> negotiation::create
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(project::list).post(project::create))
        .route("/{id}", get(project::get_by_id).put(project::update))
        .route("/{id}/timeline", get(project::timeline))
        .route(
            "/{project_id}/stages",
            get(payment_stage::list).post(payment_stage::create),
        )
        .route(
            "/{project_id}/negotiations",
            get(negotiation::list).post(negotiation::create),
        )
}

/// Routes mounted at `/stages` (stage-scoped operations).
///
/// ```text
/// POST /{id}/proof    -> submit_proof (owning client)
/// POST /{id}/approve  -> approve (admin only)
/// POST /{id}/reject   -> reject (admin only)
/// GET  /{id}/invoice  -> invoice download (owning client or admin)
/// ```
pub fn stage_router() -> Router<AppState> {
    Router::new()
        .route("/{id}/proof", post(payment_stage::submit_proof))
        .route("/{id}/approve", post(payment_stage::approve))
        .route("/{id}/reject", post(payment_stage::reject))
        .route("/{id}/invoice", get(payment_stage::invoice))
}

/// Routes mounted at `/negotiations` (negotiation-scoped operations).
///
/// ```text
/// POST /{id}/respond  -> respond (accept / reject / counter)
/// ```
pub fn negotiation_router() -> Router<AppState> {
    Router::new().route("/{id}/respond", post(negotiation::respond))
}
