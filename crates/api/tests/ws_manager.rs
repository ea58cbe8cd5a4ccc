//! Tests for the WebSocket connection registry.
//!
//! No sockets are opened here; the registry is driven directly through its
//! channel API: register/unregister, user binding, targeted and broadcast
//! delivery, stale reaping, and shutdown.

use axum::extract::ws::Message;

use atelio_api::ws::WsManager;

fn text(s: &str) -> Message {
    Message::Text(s.into())
}

#[tokio::test]
async fn registry_starts_empty() {
    let manager = WsManager::new();
    assert_eq!(manager.active_count().await, 0);
}

#[tokio::test]
async fn register_and_unregister_track_the_count() {
    let manager = WsManager::new();

    let _rx_a = manager.register("a".into(), None).await;
    let _rx_b = manager.register("b".into(), None).await;
    assert_eq!(manager.active_count().await, 2);

    manager.unregister("a").await;
    assert_eq!(manager.active_count().await, 1);

    manager.unregister("b").await;
    assert_eq!(manager.active_count().await, 0);
}

#[tokio::test]
async fn re_registering_an_id_replaces_the_entry() {
    let manager = WsManager::new();

    let _stale_rx = manager.register("dup".into(), None).await;
    let mut fresh_rx = manager.register("dup".into(), None).await;
    assert_eq!(manager.active_count().await, 1);

    manager.broadcast(text("after replace")).await;
    let msg = fresh_rx.recv().await.expect("fresh receiver gets the frame");
    assert!(matches!(&msg, Message::Text(t) if *t == "after replace"));
}

#[tokio::test]
async fn authenticate_binds_a_connection_to_its_user() {
    let manager = WsManager::new();

    let _rx = manager.register("c1".into(), None).await;
    assert!(manager.lookup_user(42).await.is_empty());

    assert!(manager.authenticate("c1", 42).await);
    assert_eq!(manager.lookup_user(42).await, vec!["c1".to_string()]);
}

#[tokio::test]
async fn authenticate_reports_unknown_connections() {
    let manager = WsManager::new();
    assert!(!manager.authenticate("nobody", 42).await);
}

#[tokio::test]
async fn push_to_user_reaches_every_connection_of_that_user_only() {
    let manager = WsManager::new();

    // User 7 has two tabs open; user 8 has one.
    let mut tab1 = manager.register("c1".into(), Some(7)).await;
    let mut tab2 = manager.register("c2".into(), Some(7)).await;
    let mut other = manager.register("c3".into(), Some(8)).await;

    let reached = manager.push_to_user(7, text("for 7")).await;
    assert_eq!(reached, 2);

    assert!(matches!(tab1.recv().await, Some(Message::Text(t)) if t == "for 7"));
    assert!(matches!(tab2.recv().await, Some(Message::Text(t)) if t == "for 7"));
    assert!(other.try_recv().is_err(), "user 8 must not see user 7's frame");
}

#[tokio::test]
async fn push_to_conn_targets_one_connection() {
    let manager = WsManager::new();

    let mut rx1 = manager.register("c1".into(), None).await;
    let mut rx2 = manager.register("c2".into(), None).await;

    assert!(manager.push_to_conn("c1", text("direct")).await);
    assert!(matches!(rx1.recv().await, Some(Message::Text(t)) if t == "direct"));
    assert!(rx2.try_recv().is_err());

    assert!(!manager.push_to_conn("nobody", text("lost")).await);
}

#[tokio::test]
async fn broadcast_reaches_authenticated_and_anonymous_alike() {
    let manager = WsManager::new();

    let mut anon = manager.register("c1".into(), None).await;
    let mut authed = manager.register("c2".into(), Some(1)).await;

    manager.broadcast(text("to everyone")).await;

    assert!(matches!(anon.recv().await, Some(Message::Text(t)) if t == "to everyone"));
    assert!(matches!(authed.recv().await, Some(Message::Text(t)) if t == "to everyone"));
}

#[tokio::test]
async fn broadcast_survives_a_dropped_receiver() {
    let manager = WsManager::new();

    let dead_rx = manager.register("dead".into(), None).await;
    let mut live_rx = manager.register("live".into(), None).await;
    drop(dead_rx);

    manager.broadcast(text("still here")).await;

    assert!(matches!(live_rx.recv().await, Some(Message::Text(t)) if t == "still here"));
}

#[tokio::test]
async fn close_all_sends_close_and_empties_the_registry() {
    let manager = WsManager::new();

    let mut rx1 = manager.register("c1".into(), None).await;
    let mut rx2 = manager.register("c2".into(), Some(5)).await;

    manager.close_all().await;
    assert_eq!(manager.active_count().await, 0);

    assert!(matches!(rx1.recv().await, Some(Message::Close(None))));
    assert!(matches!(rx2.recv().await, Some(Message::Close(None))));

    // Senders were dropped with the registry entries, so the channels end.
    assert!(rx1.recv().await.is_none());
}

#[tokio::test]
async fn reap_stale_removes_only_quiet_connections() {
    let manager = WsManager::new();

    let mut rx = manager.register("c1".into(), None).await;
    let _rx2 = manager.register("c2".into(), None).await;

    // Both just registered, so a generous cutoff reaps nothing.
    assert!(manager.reap_stale(chrono::Duration::seconds(60)).await.is_empty());
    assert_eq!(manager.active_count().await, 2);

    // A negative cutoff makes everything stale.
    let mut reaped = manager.reap_stale(chrono::Duration::seconds(-1)).await;
    reaped.sort();
    assert_eq!(reaped, vec!["c1".to_string(), "c2".to_string()]);
    assert_eq!(manager.active_count().await, 0);

    // Reaped connections are told why.
    assert!(matches!(rx.recv().await, Some(Message::Close(None))));
}

#[tokio::test]
async fn note_pong_defers_reaping() {
    let manager = WsManager::new();

    let _rx = manager.register("c1".into(), None).await;
    manager.note_pong("c1").await;

    let reaped = manager.reap_stale(chrono::Duration::seconds(30)).await;
    assert!(reaped.is_empty());
    assert_eq!(manager.active_count().await, 1);
}
