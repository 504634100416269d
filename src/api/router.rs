//! API router configuration.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{api_info, health, list_keywords, list_sessions, run_keyword, AppState};
use crate::error::WinRmError;
use crate::winrm::WinRmConfig;

/// Default port, shared with other remote keyword servers.
pub const DEFAULT_PORT: u16 = 8270;

/// Create the API router with a default WinRM connector.
pub fn create_router() -> crate::Result<Router> {
    Ok(create_router_with_state(AppState::from_config(
        WinRmConfig::default(),
    )?))
}

/// Create the API router with custom state.
pub fn create_router_with_state(state: AppState) -> Router {
    let keyword_routes = Router::new()
        .route("/", get(list_keywords))
        .route("/{name}", post(run_keyword));

    let api_v1 = Router::new()
        .route("/", get(api_info))
        .route("/sessions", get(list_sessions))
        .nest("/keywords", keyword_routes);

    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api_v1)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
}

impl ServerConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
        }
    }
}

/// Start the keyword server with a WinRM connector built from `winrm`.
pub async fn serve(config: ServerConfig, winrm: WinRmConfig) -> crate::Result<()> {
    serve_with_state(config, AppState::from_config(winrm)?).await
}

/// Start the keyword server with custom state.
pub async fn serve_with_state(config: ServerConfig, state: AppState) -> crate::Result<()> {
    let addr = config.bind_address();
    let router = create_router_with_state(state);

    tracing::info!("Starting winrm-keywords server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(WinRmError::Io)?;

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(WinRmError::Io)?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
