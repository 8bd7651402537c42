// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `courier serve` command implementation.
//!
//! Opens SQLite storage, builds the transport registry from config, wires the
//! retry orchestrator and runs the HTTP gateway until SIGINT or SIGTERM.

use std::sync::Arc;

use courier_config::model::CourierConfig;
use courier_core::{CourierError, DeliveryStore, PluginAdapter, StorageAdapter};
use courier_delivery::RetryOrchestrator;
use courier_gateway::{GatewayState, HealthState, ServerConfig};
use courier_storage::SqliteStorage;
use courier_transport::TransportRegistry;
use tracing::{error, info};

use crate::shutdown;

/// Opens and migrates the configured database.
pub async fn open_storage(config: &CourierConfig) -> Result<Arc<SqliteStorage>, CourierError> {
    let storage = SqliteStorage::new(config.storage.clone());
    storage.initialize().await?;
    Ok(Arc::new(storage))
}

/// Storage, registry and orchestrator wired from config.
pub fn build_orchestrator(
    config: &CourierConfig,
    storage: Arc<SqliteStorage>,
) -> Result<RetryOrchestrator, CourierError> {
    let registry = TransportRegistry::from_config(&config.transport)?;
    Ok(RetryOrchestrator::new(
        storage as Arc<dyn DeliveryStore>,
        Arc::new(registry),
    ))
}

/// Runs the `courier serve` command.
pub async fn run_serve(config: CourierConfig) -> Result<(), CourierError> {
    info!(name = %config.service.name, "starting courier serve");

    let storage = open_storage(&config).await?;
    let orchestrator = build_orchestrator(&config, storage.clone())?;

    let state = GatewayState {
        storage: storage.clone(),
        orchestrator: Arc::new(orchestrator),
        health: HealthState::new(env!("CARGO_PKG_VERSION")),
    };
    let server_config = ServerConfig {
        host: config.gateway.host.clone(),
        port: config.gateway.port,
    };

    let cancel = shutdown::install_signal_handler();
    let served = courier_gateway::start_server(&server_config, state, async move {
        cancel.cancelled().await;
    })
    .await;

    if let Err(e) = storage.shutdown().await {
        error!(error = %e, "storage shutdown failed");
    }
    served?;

    info!("courier serve shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber, writing to stderr.
///
/// `RUST_LOG` wins over the configured level when set.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "courier={log_level},courier_delivery={log_level},courier_gateway={log_level},\
             courier_transport={log_level},courier_storage={log_level},tower_http={log_level},warn"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}
