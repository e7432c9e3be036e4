use std::net::SocketAddr;

use apipub_core::{DynControlPlane, DynObjectStore, LifecycleReconciler};
use apipub_http::{ClientError, HttpControlPlane, HttpObjectStore};
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::{config::AppConfig, handlers};

/// State shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    pub reconciler: LifecycleReconciler,
    /// Store the published documentation is served from.
    pub store: DynObjectStore,
}

impl AppState {
    pub fn new(reconciler: LifecycleReconciler, store: DynObjectStore) -> Self {
        Self { reconciler, store }
    }

    /// Builds the state with HTTP backends taken from the config.
    pub fn from_config(cfg: &AppConfig) -> Result<Self, ClientError> {
        let control_plane: DynControlPlane = std::sync::Arc::new(HttpControlPlane::new(
            &cfg.control_plane.endpoint,
            cfg.control_plane.timeout(),
        )?);
        let object_store: DynObjectStore = std::sync::Arc::new(HttpObjectStore::new(
            &cfg.object_store.endpoint,
            cfg.object_store.timeout(),
        )?);

        let reconciler = LifecycleReconciler::new(
            control_plane,
            object_store.clone(),
            cfg.reconciler_settings(),
        );
        Ok(Self::new(reconciler, object_store))
    }
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(handlers::healthz))
        .route("/lifecycle", post(handlers::lifecycle))
        .route("/integrations/ping", post(handlers::ping))
        .route("/integrations/greeting", post(handlers::greeting))
        .route("/docs/{bucket}", get(handlers::documentation_viewer))
        .route("/docs/{bucket}/swagger.json", get(handlers::documentation))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http.request",
                        http.method = %req.method(),
                        http.target = %req.uri(),
                        http.status_code = tracing::field::Empty,
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        span.record("http.status_code", res.status().as_u16());
                        tracing::info!(
                            http.status = %res.status().as_u16(),
                            elapsed_ms = %latency.as_millis(),
                            "request handled"
                        );
                    },
                ),
        )
        .with_state(state)
}

pub struct ServerBuilder {
    addr: SocketAddr,
    state: AppState,
}

impl ServerBuilder {
    pub fn new(state: AppState) -> Self {
        Self {
            addr: AppConfig::default().addr(),
            state,
        }
    }

    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    pub fn build(self) -> ApiServer {
        ApiServer {
            addr: self.addr,
            app: build_app(self.state),
        }
    }
}

pub struct ApiServer {
    addr: SocketAddr,
    app: Router,
}

impl ApiServer {
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("listening on {}", self.addr);
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
