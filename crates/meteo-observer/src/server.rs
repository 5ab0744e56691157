//! Listener for the station dashboard.
//!
//! One TCP listener serves the dashboard page, the operator and history
//! endpoints, and every `WebSocket` observer. It runs until its task is
//! aborted.

use std::net::SocketAddr;
use std::sync::Arc;

use meteo_core::config::ServerSection;
use tokio::net::TcpListener;
use tracing::info;

use crate::router::build_router;
use crate::state::AppState;

/// Where the dashboard listens.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interface to bind; `0.0.0.0` exposes the dashboard on every interface.
    pub host: String,
    /// Dashboard port.
    pub port: u16,
}

impl ServerConfig {
    /// Host and port as a socket address.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Bind`] if the host is not an IP literal.
    pub fn socket_addr(&self) -> Result<SocketAddr, ServerError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ServerError::Bind(format!("invalid address: {e}")))
    }
}

impl From<&ServerSection> for ServerConfig {
    fn from(section: &ServerSection) -> Self {
        Self {
            host: section.host.clone(),
            port: section.port,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::from("0.0.0.0"),
            port: 8000,
        }
    }
}

/// Bind the dashboard listener and serve the station until aborted.
///
/// # Errors
///
/// Returns [`ServerError::Bind`] if the address is unusable or taken, and
/// [`ServerError::Serve`] if accepting connections fails.
pub async fn start_server(config: &ServerConfig, state: Arc<AppState>) -> Result<(), ServerError> {
    let addr = config.socket_addr()?;
    let sensors = state.station.sensors().len();
    let router = build_router(state);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| ServerError::Bind(format!("bind failed on {addr}: {e}")))?;

    info!(%addr, sensors, "Dashboard listening");

    axum::serve(listener, router)
        .await
        .map_err(|e| ServerError::Serve(format!("serve error: {e}")))?;

    Ok(())
}

/// Dashboard listener failures.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The address is malformed or already in use.
    #[error("bind error: {0}")]
    Bind(String),

    /// Accepting connections failed.
    #[error("serve error: {0}")]
    Serve(String),
}
