use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use atelio_api::config::ServerConfig;
use atelio_api::notifications::NotificationFanout;
use atelio_api::router::build_app_router;
use atelio_api::state::AppState;
use atelio_api::ws;
use atelio_events::{EmailConfig, EmailDelivery, EventBus};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    let pool = connect_database().await;

    let ws_manager = Arc::new(ws::WsManager::new());
    let heartbeat_handle = ws::start_heartbeat(Arc::clone(&ws_manager));

    let event_bus = Arc::new(EventBus::default());

    // SMTP is optional; without it notifications still hit the DB and WS.
    let email = match EmailConfig::from_env() {
        Some(cfg) => match EmailDelivery::new(cfg) {
            Ok(delivery) => {
                tracing::info!("Email delivery enabled");
                Some(delivery)
            }
            Err(e) => {
                tracing::error!(error = %e, "SMTP transport setup failed, email delivery disabled");
                None
            }
        },
        None => {
            tracing::warn!("SMTP_HOST not set, email delivery disabled");
            None
        }
    };

    let fanout = NotificationFanout::new(pool.clone(), Arc::clone(&ws_manager), email);
    let fanout_handle = tokio::spawn(fanout.run(event_bus.subscribe()));
    tracing::info!("Notification fan-out started");

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        ws_manager: Arc::clone(&ws_manager),
        event_bus: Arc::clone(&event_bus),
    };
    let app = build_app_router(state, &config);

    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Server stopped accepting connections, cleaning up");

    // Dropping the last bus sender closes the broadcast channel, which ends
    // the fan-out loop.
    drop(event_bus);
    let _ = tokio::time::timeout(Duration::from_secs(5), fanout_handle).await;
    tracing::info!("Notification fan-out shut down");

    let ws_count = ws_manager.active_count().await;
    tracing::info!(ws_count, "Closing remaining WebSocket connections");
    ws_manager.close_all().await;

    heartbeat_handle.abort();
    tracing::info!("Heartbeat task stopped");

    tracing::info!("Graceful shutdown complete");
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "atelio_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Connect, ping, and migrate. Any failure here aborts startup.
async fn connect_database() -> atelio_db::DbPool {
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = atelio_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    atelio_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    atelio_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    pool
}

/// Resolves on SIGINT or, on Unix, SIGTERM, so both an interactive Ctrl-C
/// and a process manager stop trigger the same graceful path.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received SIGINT, starting graceful shutdown"),
        () = terminate => tracing::info!("Received SIGTERM, starting graceful shutdown"),
    }
}
