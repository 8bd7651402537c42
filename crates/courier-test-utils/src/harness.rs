// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles the delivery stack on a temp SQLite database:
//! storage, a transport registry whose Wappi codes route to a
//! [`MockTransport`], the retry orchestrator and the gateway router.

use std::sync::Arc;
use std::time::Duration;

use courier_config::model::StorageConfig;
use courier_core::types::{DeliveryAttempt, DispatchResponse, Message, NewMessage};
use courier_core::{CourierError, DeliveryStore, StorageAdapter};
use courier_delivery::RetryOrchestrator;
use courier_gateway::{GatewayState, HealthState, build_router};
use courier_storage::SqliteStorage;
use courier_transport::registry::WAPPI_CODES;
use courier_transport::{SimulatedTransport, TransportRegistry};
use tokio::sync::Barrier;

use crate::flaky_store::FlakyStore;
use crate::mock_transport::MockTransport;

pub const TEST_RECIPIENT: &str = "+7 900 123-45-67";
pub const TEST_TEXT: &str = "Your code is 1234";

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    responses: Vec<DispatchResponse>,
    default_response: Option<DispatchResponse>,
    delay: Option<Duration>,
    barrier: Option<Arc<Barrier>>,
    simulate_unknown_providers: bool,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            responses: Vec::new(),
            default_response: None,
            delay: None,
            barrier: None,
            simulate_unknown_providers: false,
        }
    }

    /// Scripted transport responses, answered in order.
    pub fn with_responses(mut self, responses: Vec<DispatchResponse>) -> Self {
        self.responses = responses;
        self
    }

    /// Response used once the scripted ones run out.
    pub fn with_default_response(mut self, response: DispatchResponse) -> Self {
        self.default_response = Some(response);
        self
    }

    pub fn with_transport_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Holds each send on `barrier`.
    pub fn with_barrier(mut self, barrier: Arc<Barrier>) -> Self {
        self.barrier = Some(barrier);
        self
    }

    /// Route unknown provider codes to an always-successful simulated transport.
    pub fn with_simulated_fallback(mut self) -> Self {
        self.simulate_unknown_providers = true;
        self
    }

    /// Build the test harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, CourierError> {
        let temp_dir = tempfile::TempDir::new().map_err(CourierError::storage)?;
        let db_path = temp_dir.path().join("test.db");

        let storage = Arc::new(SqliteStorage::new(StorageConfig {
            database_path: db_path.to_string_lossy().into_owned(),
            wal_mode: true,
        }));
        storage.initialize().await?;

        let mut transport = match self.default_response {
            Some(response) => MockTransport::always(response),
            None => MockTransport::new(),
        };
        for response in self.responses {
            transport.push_response(response).await;
        }
        if let Some(delay) = self.delay {
            transport = transport.with_delay(delay);
        }
        if let Some(barrier) = self.barrier {
            transport = transport.with_barrier(barrier);
        }
        let transport = Arc::new(transport);

        let mut registry = TransportRegistry::new();
        for code in WAPPI_CODES {
            registry.register(*code, transport.clone());
        }
        if self.simulate_unknown_providers {
            registry.set_fallback(Arc::new(SimulatedTransport::with_seed(
                Duration::ZERO,
                1.0,
                7,
            )));
        }

        let store: Arc<FlakyStore> = Arc::new(FlakyStore::new(storage.clone()));
        let orchestrator = Arc::new(RetryOrchestrator::new(
            store.clone() as Arc<dyn DeliveryStore>,
            Arc::new(registry),
        ));

        let api_key = storage.create_api_key("test").await?.api_key;

        Ok(TestHarness {
            storage,
            transport,
            store,
            orchestrator,
            api_key,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete delivery stack backed by a temp database.
pub struct TestHarness {
    pub storage: Arc<SqliteStorage>,
    pub transport: Arc<MockTransport>,
    /// The store the orchestrator writes through; flip its switches to inject failures.
    pub store: Arc<FlakyStore>,
    pub orchestrator: Arc<RetryOrchestrator>,
    /// An active API key.
    pub api_key: String,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Harness with a transport that always answers 200.
    pub async fn new() -> Result<Self, CourierError> {
        Self::builder().build().await
    }

    /// Inserts a pending message with no attempts.
    pub async fn seed_message(&self, message_id: &str, provider: &str) -> Result<(), CourierError> {
        self.storage
            .insert_message(&NewMessage {
                message_id: message_id.to_string(),
                provider: provider.to_string(),
                recipient: TEST_RECIPIENT.to_string(),
                message_text: TEST_TEXT.to_string(),
                max_attempts: 3,
            })
            .await
    }

    /// Overwrites status and attempt counter without adding attempt rows.
    pub async fn set_message_state(
        &self,
        message_id: &str,
        status: &str,
        attempts: u32,
    ) -> Result<(), CourierError> {
        let id = message_id.to_string();
        let status = status.to_string();
        self.storage
            .database()?
            .connection()
            .call(move |conn| -> Result<(), rusqlite::Error> {
                conn.execute(
                    "UPDATE messages SET status = ?1, attempts = ?2 WHERE message_id = ?3",
                    rusqlite::params![status, attempts, id],
                )?;
                Ok(())
            })
            .await
            .map_err(courier_storage::database::map_tr_err)
    }

    pub async fn message(&self, message_id: &str) -> Result<Option<Message>, CourierError> {
        self.storage.get_message(message_id).await
    }

    pub async fn attempts(&self, message_id: &str) -> Result<Vec<DeliveryAttempt>, CourierError> {
        self.storage.list_attempts(message_id).await
    }

    pub fn gateway_state(&self) -> GatewayState {
        GatewayState {
            storage: self.storage.clone(),
            orchestrator: self.orchestrator.clone(),
            health: HealthState::new("0.0.0-test"),
        }
    }

    pub fn router(&self) -> axum::Router {
        build_router(self.gateway_state())
    }
}
