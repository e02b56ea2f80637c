use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use solver_core::{Ingestor, Orchestrator};
use tokio::sync::watch;

use crate::error::GatewayError;
use crate::router::{RouterSettings, build_router};

/// Shared by every handler: the answer pipeline, the upload extractor and the
/// moment the server began serving.
#[derive(Clone)]
pub(crate) struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub ingestor: Ingestor,
    pub started_at: Instant,
}

impl AppState {
    pub(crate) fn new(orchestrator: Arc<Orchestrator>, ingestor: Ingestor) -> Self {
        Self {
            orchestrator,
            ingestor,
            started_at: Instant::now(),
        }
    }
}

/// HTTP front end for one [`Orchestrator`].
pub struct GatewayServer {
    addr: SocketAddr,
    state: AppState,
    settings: RouterSettings,
    shutdown_rx: watch::Receiver<bool>,
}

impl GatewayServer {
    #[must_use]
    pub fn new(
        bind: &str,
        port: u16,
        orchestrator: Arc<Orchestrator>,
        ingestor: Ingestor,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        Self {
            addr: resolve_addr(bind, port),
            state: AppState::new(orchestrator, ingestor),
            settings: RouterSettings::default(),
            shutdown_rx,
        }
    }

    #[must_use]
    pub fn with_auth(mut self, token: Option<String>) -> Self {
        self.settings.auth_token = token;
        self
    }

    #[must_use]
    pub fn with_rate_limit(mut self, limit: u32) -> Self {
        self.settings.rate_limit = limit;
        self
    }

    #[must_use]
    pub fn with_max_body_size(mut self, size: usize) -> Self {
        self.settings.max_body_size = size;
        self
    }

    fn router(&self) -> Router {
        build_router(self.state.clone(), &self.settings)
    }

    /// Serve `/api/` and `/health` until the shutdown channel flips to `true`.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot bind or the server hits a fatal I/O error.
    pub async fn serve(mut self) -> Result<(), GatewayError> {
        self.state.started_at = Instant::now();
        let router = self.router();

        let listener = tokio::net::TcpListener::bind(self.addr)
            .await
            .map_err(|e| GatewayError::Bind(self.addr.to_string(), e))?;
        tracing::info!(addr = %self.addr, "gateway listening");

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_requested(self.shutdown_rx))
        .await
        .map_err(|e| GatewayError::Server(e.to_string()))
    }
}

/// `bind:port`, or loopback on `port` when `bind` is not an IP address.
fn resolve_addr(bind: &str, port: u16) -> SocketAddr {
    let addr = format!("{bind}:{port}").parse().unwrap_or_else(|e| {
        tracing::warn!("invalid bind '{bind}': {e}, falling back to 127.0.0.1:{port}");
        SocketAddr::from(([127, 0, 0, 1], port))
    });
    if addr.ip().is_unspecified() {
        tracing::warn!("gateway binding to {}, reachable from every interface", addr.ip());
    }
    addr
}

/// Resolves once `true` is sent; a dropped sender never triggers shutdown.
async fn shutdown_requested(mut rx: watch::Receiver<bool>) {
    if rx.wait_for(|stop| *stop).await.is_err() {
        std::future::pending::<()>().await;
    }
    tracing::info!("gateway shutting down");
}
