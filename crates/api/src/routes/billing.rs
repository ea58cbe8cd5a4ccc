//! Route definitions for the caller's billing profile.

use axum::routing::get;
use axum::Router;

use crate::handlers::billing;
use crate::state::AppState;

/// Routes mounted at `/billing-profile`.
///
/// ```text
/// GET / -> get
/// PUT / -> put (create or replace)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(billing::get).put(billing::put))
}
