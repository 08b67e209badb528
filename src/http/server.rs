//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the proxy, session and page handlers
//! - Wire up middleware (request ID, tracing)
//! - Swap in reloaded configuration without dropping in-flight requests
//! - Stop gracefully on the shutdown broadcast

use std::sync::Arc;

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    routing::{any, get, post},
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::api::InternalApi;
use crate::config::GatewayConfig;
use crate::http::{pages, proxy, session};
use crate::lifecycle::shutdown;
use crate::resilience::{CancellationSource, TimerCancellation};
use crate::routing::RouteTable;

/// Everything derived from one configuration snapshot.
#[derive(Debug)]
pub struct SharedState {
    pub config: GatewayConfig,
    pub routes: RouteTable,
    pub internal: InternalApi,
}

impl SharedState {
    fn build(config: GatewayConfig, http: &reqwest::Client, cancellation: &Arc<dyn CancellationSource>) -> Self {
        let internal = InternalApi::new(
            http.clone(),
            config.backend.internal_base.clone(),
            config.timeouts.request(),
            cancellation.clone(),
        );
        Self {
            config,
            routes: RouteTable::standard(),
            internal,
        }
    }
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    shared: Arc<ArcSwap<SharedState>>,
    pub client: Client<HttpConnector, Body>,
    http: reqwest::Client,
    pub cancellation: Arc<dyn CancellationSource>,
}

impl AppState {
    /// The configuration snapshot to use for the rest of a request.
    pub fn snapshot(&self) -> Arc<SharedState> {
        self.shared.load_full()
    }

    /// Replace the snapshot. Requests already holding the old one keep it.
    pub fn reload(&self, config: GatewayConfig) {
        let current = self.snapshot();
        if current.config.listener != config.listener || current.config.routes != config.routes {
            tracing::warn!("Listener and route prefix changes take effect after a restart");
        }
        if current.config.observability != config.observability {
            tracing::warn!("Observability changes take effect after a restart");
        }
        let next = SharedState::build(config, &self.http, &self.cancellation);
        self.shared.store(Arc::new(next));
        tracing::info!("Configuration reloaded");
    }
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    /// Create a server that bounds backend calls with real timers.
    pub fn new(config: GatewayConfig) -> Self {
        Self::with_cancellation(config, Arc::new(TimerCancellation::new()))
    }

    /// Create a server using `cancellation` for every backend call.
    pub fn with_cancellation(config: GatewayConfig, cancellation: Arc<dyn CancellationSource>) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        let http = reqwest::Client::new();
        let prefix = config.routes.api_prefix.clone();

        let shared = SharedState::build(config, &http, &cancellation);
        let state = AppState {
            shared: Arc::new(ArcSwap::from_pointee(shared)),
            client,
            http,
            cancellation,
        };

        let router = Self::build_router(&prefix, state.clone());
        Self { router, state }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(prefix: &str, state: AppState) -> Router {
        let api = Router::new()
            .route("/session", post(session::create).delete(session::delete))
            .route("/{resource}", any(proxy::forward))
            .route("/{resource}/{*rest}", any(proxy::forward_nested));

        Router::new()
            .nest(prefix, api)
            .route("/", get(pages::feed))
            .route("/a/{handle}", get(pages::account))
            .route("/a/{handle}/p/{photo_id}", get(pages::account_photo))
            .route("/p/{photo_id}", get(pages::photo))
            .route("/e/{edit_id}", get(pages::edit))
            .route("/c", get(pages::catalog))
            .route("/magic", get(session::magic))
            .route("/l", get(session::logout))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Serve until `shutdown` fires, applying configs from `config_updates`.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<GatewayConfig>,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let state = self.state.clone();
        let reloader = tokio::spawn(async move {
            while let Some(config) = config_updates.recv().await {
                state.reload(config);
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait(shutdown))
            .await?;

        reloader.abort();
        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
