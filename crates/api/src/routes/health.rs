//! Liveness endpoint, mounted at the root rather than under `/api/v1` so
//! load balancers can probe it without auth or versioning.

use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
struct Health {
    status: &'static str,
    version: &'static str,
    database: &'static str,
}

/// GET /health
///
/// Always 200; a broken database turns `status` to `degraded` instead of
/// failing the probe, so orchestrators restart on our terms.
async fn health(State(state): State<AppState>) -> Json<Health> {
    let db_ok = atelio_db::health_check(&state.pool).await.is_ok();

    Json(Health {
        status: if db_ok { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        database: if db_ok { "reachable" } else { "unreachable" },
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
