mod backend;
mod config;
mod routes;
mod services;
mod state;
mod views;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "rtims_portal=info,tower_http=info";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = config::PortalConfig::from_env().expect("invalid portal configuration");
    let backend = backend::SupabaseClient::new(&config.backend).expect("backend client init failed");
    tracing::info!(
        url = %config.backend.url,
        request_timeout_secs = config.backend.timeouts.request_secs,
        "backend client initialized"
    );

    let state = state::AppState::new(Arc::new(backend), config.cookie_secure);

    // Log auth-state changes for the lifetime of the process.
    let _auth_events = services::session::spawn_auth_event_logger(&state.sessions);
    let _session_sweeper = services::session::spawn_session_sweeper(&state.sessions, config.sessions);

    let app = routes::app(state);
    let port = config.port;
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "rtims portal listening");
    axum::serve(listener, app).await.expect("server failed");
}
