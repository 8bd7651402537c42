// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    http::{HeaderName, Method, header},
    routing::{get, post},
};
use courier_core::{CourierError, StorageAdapter};
use courier_delivery::RetryOrchestrator;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::API_KEY_HEADER;
use crate::{handlers, providers};

/// Health state for the unauthenticated health endpoint.
#[derive(Clone)]
pub struct HealthState {
    /// Process start time for uptime calculation.
    pub start_time: std::time::Instant,
    /// Version reported by the health probe.
    pub version: String,
}

impl HealthState {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            start_time: std::time::Instant::now(),
            version: version.into(),
        }
    }
}

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// Message, provider and API-key store.
    pub storage: Arc<dyn StorageAdapter>,
    /// Drives `POST /api/retry`.
    pub orchestrator: Arc<RetryOrchestrator>,
    pub health: HealthState,
}

/// Gateway server configuration (mirrors `GatewayConfig` from courier-config).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static(API_KEY_HEADER)])
        .max_age(Duration::from_secs(86_400))
}

/// Builds the full router.
///
/// - GET /health (no auth)
/// - POST /api/retry
/// - GET /api/messages
/// - GET|PUT|POST|DELETE /api/providers
/// - GET /api/providers/config
///
/// Any other method on a known path answers 405 before authentication runs.
pub fn build_router(state: GatewayState) -> Router {
    Router::new()
        .route(
            "/health",
            get(handlers::health).fallback(handlers::method_not_allowed),
        )
        .route(
            "/api/retry",
            post(handlers::retry)
                .options(handlers::preflight)
                .fallback(handlers::method_not_allowed),
        )
        .route(
            "/api/messages",
            get(handlers::list_messages)
                .options(handlers::preflight)
                .fallback(handlers::method_not_allowed),
        )
        .route(
            "/api/providers",
            get(providers::list_providers)
                .put(providers::create_provider)
                .post(providers::update_provider)
                .delete(providers::delete_provider)
                .options(handlers::preflight)
                .fallback(handlers::method_not_allowed),
        )
        .route(
            "/api/providers/config",
            get(providers::get_provider_config)
                .options(handlers::preflight)
                .fallback(handlers::method_not_allowed),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .with_state(state)
}

/// Binds the listener for the configured address.
pub async fn bind(config: &ServerConfig) -> Result<TcpListener, CourierError> {
    let addr = format!("{}:{}", config.host, config.port);
    TcpListener::bind(&addr)
        .await
        .map_err(|e| CourierError::Internal(format!("failed to bind gateway to {addr}: {e}")))
}

/// Serves the gateway on an already bound listener until `shutdown` resolves.
pub async fn serve(
    listener: TcpListener,
    state: GatewayState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), CourierError> {
    let app = build_router(state);

    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "gateway server listening");
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| CourierError::Internal(format!("gateway server error: {e}")))
}

/// Binds to the configured host:port and serves until `shutdown` resolves.
pub async fn start_server(
    config: &ServerConfig,
    state: GatewayState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), CourierError> {
    let listener = bind(config).await?;
    serve(listener, state, shutdown).await
}
