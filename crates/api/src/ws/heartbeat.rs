use std::sync::Arc;
use std::time::Duration;

use crate::ws::manager::WsManager;

const HEARTBEAT_INTERVAL_SECS: u64 = 30;

/// Spawn the heartbeat task: every interval it reaps connections that went
/// quiet and pings the rest.
///
/// A connection counts as dead when two full intervals pass without a Pong.
/// Abort the returned handle during shutdown.
pub fn start_heartbeat(ws_manager: Arc<WsManager>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(HEARTBEAT_INTERVAL_SECS));
        let max_age = chrono::Duration::seconds(2 * HEARTBEAT_INTERVAL_SECS as i64);

        loop {
            interval.tick().await;

            let reaped = ws_manager.reap_stale(max_age).await;
            if !reaped.is_empty() {
                tracing::info!(count = reaped.len(), "Reaped stale WebSocket connections");
            }

            let count = ws_manager.active_count().await;
            tracing::debug!(count, "WebSocket heartbeat ping");
            ws_manager.ping_all().await;
        }
    })
}
