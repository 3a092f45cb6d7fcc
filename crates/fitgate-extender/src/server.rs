use crate::handlers::{filter, healthz, livez, readyz};
use crate::tls::{resolve_tls, TlsMode};
use crate::AppState;
use axum::routing::{get, post};
use axum::Router;
use miette::{Context, IntoDiagnostic};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Grace period for in-flight requests once shutdown starts
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Extender server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Address to listen on
    pub listen_addr: SocketAddr,
    /// Path prefix in front of the filter verb (the scheduler's `urlPrefix`)
    pub url_prefix: String,
    /// TLS setup
    pub tls: TlsMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 8888)),
            url_prefix: String::new(),
            tls: TlsMode::Disabled,
        }
    }
}

/// Route of the filter verb under a URL prefix
pub fn filter_route(url_prefix: &str) -> String {
    let prefix = url_prefix.trim_matches('/');
    if prefix.is_empty() {
        "/filter".to_string()
    } else {
        format!("/{}/filter", prefix)
    }
}

/// Scheduler extender HTTP server
pub struct ExtenderServer {
    config: Config,
    state: Arc<AppState>,
}

impl ExtenderServer {
    /// Create a new extender server
    pub fn new(config: Config, state: Arc<AppState>) -> Self {
        Self { config, state }
    }

    /// Build the router
    pub fn build_router(&self) -> Router {
        Router::new()
            // Health checks
            .route("/healthz", get(healthz))
            .route("/livez", get(livez))
            .route("/readyz", get(readyz))
            // Filter verb
            .route(&filter_route(&self.config.url_prefix), post(filter))
            // Add tracing and state
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Run the server until the token is cancelled
    pub async fn run(self, token: CancellationToken) -> miette::Result<()> {
        let app = self.build_router();
        let addr = self.config.listen_addr;

        match resolve_tls(&self.config.tls)? {
            None => {
                info!("Starting extender on http://{}", addr);

                let listener = TcpListener::bind(addr)
                    .await
                    .into_diagnostic()
                    .wrap_err_with(|| format!("failed to bind {}", addr))?;

                axum::serve(listener, app)
                    .with_graceful_shutdown(token.cancelled_owned())
                    .await
                    .into_diagnostic()
                    .wrap_err("extender server failed")
            }
            Some(material) => {
                info!("Starting extender on https://{}", addr);

                let tls_config = material.into_rustls_config()?;
                let handle = axum_server::Handle::new();
                let shutdown = handle.clone();
                tokio::spawn(async move {
                    token.cancelled().await;
                    shutdown.graceful_shutdown(Some(SHUTDOWN_GRACE));
                });

                axum_server::bind_rustls(addr, tls_config)
                    .handle(handle)
                    .serve(app.into_make_service())
                    .await
                    .into_diagnostic()
                    .wrap_err("extender server failed")
            }
        }
    }
}
