use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::Router;
use configs::{AppConfig, OnCorrupt};
use tower_http::cors::CorsLayer;
use tracing::{debug, info};

use crate::errors::StartupError;
use crate::routes::{self, auth};
use service::session::SessionStore;
use service::storage::{CorruptPolicy, DocumentStore};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn corrupt_policy(c: OnCorrupt) -> CorruptPolicy {
    match c {
        OnCorrupt::Reset => CorruptPolicy::Reset,
        OnCorrupt::Fail => CorruptPolicy::Fail,
    }
}

/// Open the data file and wire the services together.
pub async fn build_state(cfg: &AppConfig) -> Result<auth::ServerState, StartupError> {
    if cfg.storage.data_file.trim().is_empty() {
        return Err(StartupError::InvalidConfig("storage.data_file is empty".into()));
    }
    let store = DocumentStore::new(&cfg.storage.data_file, corrupt_policy(cfg.storage.on_corrupt)).await?;
    let sessions = SessionStore::with_ttl_hours(cfg.session.ttl_hours);
    let cookie = auth::ServerAuthConfig {
        cookie_name: cfg.session.cookie_name.clone(),
        secure_cookie: cfg.session.secure_cookie,
    };
    Ok(auth::ServerState::new(store, sessions, cookie))
}

/// Periodically drop expired sessions so the map does not grow without bound.
fn spawn_session_sweeper(sessions: Arc<SessionStore>, every: Duration) {
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(every);
        tick.tick().await;
        loop {
            tick.tick().await;
            let purged = sessions.purge_expired();
            if purged > 0 {
                debug!(purged, remaining = sessions.len(), "expired sessions purged");
            }
        }
    });
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!(event = "shutdown_signal", "received Ctrl+C, shutting down");
    }
}

/// Public entry: build the app and run the HTTP server until Ctrl+C.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    common::env::ensure_env(&cfg.frontend.dir, &cfg.storage.data_file).await?;

    let state = build_state(&cfg).await?;
    spawn_session_sweeper(
        Arc::clone(&state.sessions),
        Duration::from_secs(cfg.session.sweep_interval_secs.max(1)),
    );

    let app: Router = routes::build_router(state, &cfg.frontend.dir, build_cors());

    // Bind and serve
    let addr: SocketAddr = cfg.server.bind_addr().parse()?;
    info!(%addr, data_file = %cfg.storage.data_file, "enterprise-crud listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    Ok(())
}
