//! Registry of live WebSocket connections.
//!
//! Each connection gets an unbounded mpsc channel; the upgrade handler owns
//! the receiving half and forwards frames to the socket sink, while everything
//! else (notification fan-out, heartbeat, shutdown) talks to connections
//! through this registry. The registry is constructed once at startup and
//! passed around in an `Arc`; there is no global instance.

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::ws::Message;
use tokio::sync::{mpsc, RwLock};

use atelio_core::types::{DbId, Timestamp};

/// Sending half of a connection's outbound channel.
pub type WsSender = mpsc::UnboundedSender<Message>;

/// Book-keeping for one live connection.
pub struct WsConnection {
    /// Set once the client has presented a valid token.
    pub user_id: Option<DbId>,
    pub sender: WsSender,
    pub connected_at: Timestamp,
    /// Updated on every Pong; the heartbeat reaps connections whose stamp
    /// falls too far behind.
    pub last_pong: Timestamp,
}

/// The connection registry. Interior `RwLock`, safe to share via `Arc`.
pub struct WsManager {
    conns: RwLock<HashMap<String, WsConnection>>,
}

impl WsManager {
    pub fn new() -> Self {
        Self {
            conns: RwLock::new(HashMap::new()),
        }
    }

    /// Add a connection under `conn_id` and hand back the receiver the
    /// upgrade handler drains into the socket sink.
    ///
    /// Registering an id that already exists replaces the old entry; its
    /// channel closes and the old forwarding task winds down on its own.
    pub async fn register(
        &self,
        conn_id: String,
        user_id: Option<DbId>,
    ) -> mpsc::UnboundedReceiver<Message> {
        let (tx, rx) = mpsc::unbounded_channel();
        let now = chrono::Utc::now();
        self.conns.write().await.insert(
            conn_id,
            WsConnection {
                user_id,
                sender: tx,
                connected_at: now,
                last_pong: now,
            },
        );
        rx
    }

    /// Drop a connection from the registry.
    pub async fn unregister(&self, conn_id: &str) {
        self.conns.write().await.remove(conn_id);
    }

    /// Bind a connection to a user after a successful auth frame.
    ///
    /// `false` means the connection is gone (reaped between the upgrade and
    /// the auth message).
    pub async fn authenticate(&self, conn_id: &str, user_id: DbId) -> bool {
        match self.conns.write().await.get_mut(conn_id) {
            Some(conn) => {
                conn.user_id = Some(user_id);
                true
            }
            None => false,
        }
    }

    /// Refresh a connection's liveness stamp on Pong.
    pub async fn note_pong(&self, conn_id: &str) {
        if let Some(conn) = self.conns.write().await.get_mut(conn_id) {
            conn.last_pong = chrono::Utc::now();
        }
    }

    /// Ids of every connection authenticated as `user_id`.
    pub async fn lookup_user(&self, user_id: DbId) -> Vec<String> {
        let conns = self.conns.read().await;
        conns
            .iter()
            .filter(|(_, c)| c.user_id == Some(user_id))
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Queue a frame for a single connection. `false` when the id is unknown
    /// or its channel has closed.
    pub async fn push_to_conn(&self, conn_id: &str, message: Message) -> bool {
        match self.conns.read().await.get(conn_id) {
            Some(conn) => conn.sender.send(message).is_ok(),
            None => false,
        }
    }

    /// Queue a frame for every connection of one user, returning how many
    /// connections it reached.
    pub async fn push_to_user(&self, user_id: DbId, message: Message) -> usize {
        let conns = self.conns.read().await;
        conns
            .values()
            .filter(|c| c.user_id == Some(user_id))
            .filter(|c| c.sender.send(message.clone()).is_ok())
            .count()
    }

    /// Queue a frame for every connection, authenticated or not.
    ///
    /// Closed channels are skipped; those entries disappear when their
    /// receive loop exits.
    pub async fn broadcast(&self, message: Message) {
        for conn in self.conns.read().await.values() {
            let _ = conn.sender.send(message.clone());
        }
    }

    /// Number of live connections.
    pub async fn active_count(&self) -> usize {
        self.conns.read().await.len()
    }

    /// Ping every connection. The heartbeat task calls this on its interval.
    pub async fn ping_all(&self) {
        for conn in self.conns.read().await.values() {
            let _ = conn.sender.send(Message::Ping(Bytes::new()));
        }
    }

    /// Remove connections whose last Pong is older than `max_age`, sending
    /// each a Close frame first. Returns the reaped ids.
    pub async fn reap_stale(&self, max_age: chrono::Duration) -> Vec<String> {
        let cutoff = chrono::Utc::now() - max_age;
        let mut conns = self.conns.write().await;

        let stale: Vec<String> = conns
            .iter()
            .filter(|(_, c)| c.last_pong < cutoff)
            .map(|(id, _)| id.clone())
            .collect();

        for id in &stale {
            if let Some(conn) = conns.remove(id) {
                let _ = conn.sender.send(Message::Close(None));
            }
        }
        stale
    }

    /// Close every connection and empty the registry. Graceful shutdown only.
    pub async fn close_all(&self) {
        let mut conns = self.conns.write().await;
        let count = conns.len();
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Close(None));
        }
        conns.clear();
        tracing::info!(count, "Closed all WebSocket connections");
    }
}

impl Default for WsManager {
    fn default() -> Self {
        Self::new()
    }
}
