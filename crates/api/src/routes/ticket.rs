//! Route definitions for the `/tickets` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::ticket;
use crate::state::AppState;

/// Routes mounted at `/tickets`.
///
/// ```text
/// GET  /                 -> list (own for clients, all for staff)
/// POST /                 -> create
/// GET  /{id}             -> get_by_id (ticket + thread)
/// POST /{id}/responses   -> respond
/// POST /{id}/close       -> close
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(ticket::list).post(ticket::create))
        .route("/{id}", get(ticket::get_by_id))
        .route("/{id}/responses", post(ticket::respond))
        .route("/{id}/close", post(ticket::close))
}
