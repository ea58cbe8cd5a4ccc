use std::sync::Arc;

use crate::config::ServerConfig;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: atelio_db::DbPool,
    /// Server configuration (JWT secrets, timeouts, CORS).
    pub config: Arc<ServerConfig>,
    /// WebSocket connection manager.
    pub ws_manager: Arc<WsManager>,
    /// Event bus for publishing domain events; the notification fan-out
    /// subscribes to it.
    pub event_bus: Arc<atelio_events::EventBus>,
}
