//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router, one route per catalog endpoint
//! - Wire up middleware (tracing, request ID, CORS)
//! - Serve on a bound listener until shutdown
//! - Apply configuration updates to the running server

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use arc_swap::ArcSwap;
use axum::extract::{RawQuery, State};
use axum::http::HeaderMap;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::config::ProxyConfig;
use crate::endpoints::{catalog, EndpointDescriptor};
use crate::security::cors_layers;
use crate::upstream::UpstreamClient;

use super::handlers;
use super::request::{propagate_request_id_layer, set_request_id_layer, X_REQUEST_ID};
use super::status;

/// Runtime snapshot, replaced as a whole on config reload.
#[derive(Debug)]
pub struct InnerState {
    pub config: ProxyConfig,
    pub upstream: UpstreamClient,
}

impl InnerState {
    pub fn from_config(config: ProxyConfig) -> Result<Self, reqwest::Error> {
        let upstream = UpstreamClient::new(&config.upstream)?;
        Ok(Self { config, upstream })
    }
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub inner: Arc<ArcSwap<InnerState>>,
    pub request_count: Arc<AtomicUsize>,
}

impl AppState {
    pub fn new(config: ProxyConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            inner: Arc::new(ArcSwap::from_pointee(InnerState::from_config(config)?)),
            request_count: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Swap in a new snapshot built from `config`.
    ///
    /// The listener is bound once at startup, so a changed bind address is
    /// only reported.
    pub fn apply_config(&self, config: ProxyConfig) -> Result<(), reqwest::Error> {
        let current = self.inner.load();
        if current.config.listener.bind_address != config.listener.bind_address {
            tracing::warn!(
                current = %current.config.listener.bind_address,
                requested = %config.listener.bind_address,
                "Bind address change requires a restart"
            );
        }

        let next = InnerState::from_config(config)?;
        tracing::info!(upstream = %next.upstream.base_url(), "Configuration applied");
        self.inner.store(Arc::new(next));
        Ok(())
    }
}

/// HTTP server for the precedent proxy.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    pub fn new(config: ProxyConfig) -> Result<Self, reqwest::Error> {
        let state = AppState::new(config)?;
        let router = Self::build_router(state.clone());
        Ok(Self { router, state })
    }

    /// Build the Axum router with all middleware layers.
    pub fn build_router(state: AppState) -> Router {
        let mut router = Router::new()
            .route("/health", get(status::get_health))
            .route("/status", get(status::get_status));

        for &descriptor in catalog::all() {
            router = router.route(descriptor.route, endpoint_route(descriptor));
        }

        let [allow_origin, allow_methods, allow_headers] = cors_layers();

        router
            .fallback(handlers::not_found)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(set_request_id_layer())
                    .layer(TraceLayer::new_for_http().make_span_with(
                        |request: &axum::http::Request<axum::body::Body>| {
                            let request_id = request
                                .headers()
                                .get(X_REQUEST_ID)
                                .and_then(|v| v.to_str().ok())
                                .unwrap_or("unknown");
                            tracing::info_span!(
                                "request",
                                method = %request.method(),
                                path = %request.uri().path(),
                                request_id = %request_id,
                            )
                        },
                    ))
                    .layer(propagate_request_id_layer())
                    .layer(allow_origin)
                    .layer(allow_methods)
                    .layer(allow_headers),
            )
    }

    /// Serve on `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<ProxyConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let state = self.state.clone();
        let mut reload_shutdown = shutdown.resubscribe();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    update = config_updates.recv() => match update {
                        Some(config) => {
                            if let Err(e) = state.apply_config(config) {
                                tracing::error!(error = %e, "Failed to apply configuration");
                            }
                        }
                        None => break,
                    },
                    _ = reload_shutdown.recv() => break,
                }
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

fn endpoint_route(
    descriptor: &'static EndpointDescriptor,
) -> axum::routing::MethodRouter<AppState> {
    get(
        move |State(state): State<AppState>, headers: HeaderMap, RawQuery(query): RawQuery| {
            handlers::proxy(descriptor, state, headers, query)
        },
    )
    .options(handlers::preflight)
}
