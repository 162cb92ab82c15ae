//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, timeout, body limit, gate)
//! - Bind server to listener
//! - Graceful shutdown on signal or broadcast

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{ModelCatalog, ProxyConfig};
use crate::http::handlers;
use crate::keys::TokenStore;
use crate::proxy::{ForwardingProxy, RequestTransformer};
use crate::security::{security_gate_middleware, GateLayerState, SecurityGate};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub tokens: Arc<TokenStore>,
    pub transformer: Arc<RequestTransformer>,
    pub forwarder: Arc<ForwardingProxy>,
    pub models: ModelCatalog,
    pub public_endpoint_url: Option<String>,
}

/// HTTP server for the chat proxy.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, reqwest::Error> {
        let state = AppState {
            tokens: Arc::new(TokenStore::new()),
            transformer: Arc::new(RequestTransformer::new(&config.models)),
            forwarder: Arc::new(ForwardingProxy::new(&config.upstream)?),
            models: config.models.clone(),
            public_endpoint_url: config.upstream.public_endpoint_url.clone(),
        };

        Ok(Self {
            router: Self::build_router(&config, state),
        })
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Layer order (outermost first): request-id set/propagate, trace,
    /// timeout, body limit, security gate. The gate therefore sees every
    /// request after it has a correlation id and before any handler runs.
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        let gate_state = Arc::new(GateLayerState {
            gate: SecurityGate::new(&config.security, &config.rate_limit),
            max_body_bytes: config.listener.max_body_bytes,
        });

        // The timeout backstops the upstream call; streaming responses
        // produce headers early and are not cut off by it.
        let request_timeout = Duration::from_secs(config.upstream.timeout_secs + 5);

        Router::new()
            .route("/health", get(handlers::health))
            .route("/v1/generate-key", post(handlers::generate_key))
            .route("/v1/models", get(handlers::list_models))
            .route("/v1/chat/completions", post(handlers::chat_completions))
            .with_state(state)
            .layer(middleware::from_fn_with_state(
                gate_state,
                security_gate_middleware,
            ))
            .layer(RequestBodyLimitLayer::new(config.listener.max_body_bytes))
            .layer(TimeoutLayer::new(request_timeout))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Run the server until shutdown is signalled.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = shutdown_signal() => {}
                    _ = shutdown.recv() => {}
                }
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Wait for Ctrl+C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        // Fall back to never resolving; the broadcast channel still works.
        std::future::pending::<()>().await;
    }
}
