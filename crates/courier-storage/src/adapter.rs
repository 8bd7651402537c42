// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the storage traits.

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::OnceCell;
use tracing::debug;

use courier_config::model::StorageConfig;
use courier_core::types::{
    ApiKeyRecord, DeliveryAttempt, Message, NewAttempt, NewMessage, NewProvider,
    ProviderOverview, ProviderRecord, StatusTransition,
};
use courier_core::{
    AdapterType, CourierError, DeliveryStore, HealthStatus, PluginAdapter, StorageAdapter,
};

use crate::database::Database;
use crate::queries;

/// SQLite-backed storage adapter.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. The database is lazily initialized on the first
/// call to [`StorageAdapter::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    ///
    /// The database connection is not opened until [`StorageAdapter::initialize`] is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Returns a reference to the underlying Database, or an error if not initialized.
    pub fn database(&self) -> Result<&Database, CourierError> {
        self.db()
    }

    fn db(&self) -> Result<&Database, CourierError> {
        self.db
            .get()
            .ok_or_else(|| CourierError::storage("storage not initialized -- call initialize() first"))
    }

    async fn checkpoint(&self, db: &Database) -> Result<(), CourierError> {
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, CourierError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), CourierError> {
        if let Some(db) = self.db.get() {
            self.checkpoint(db).await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl DeliveryStore for SqliteStorage {
    async fn get_message(&self, message_id: &str) -> Result<Option<Message>, CourierError> {
        queries::messages::get_message(self.db()?, message_id).await
    }

    async fn commit_attempt(
        &self,
        attempt: &NewAttempt,
        transition: &StatusTransition,
    ) -> Result<(), CourierError> {
        queries::attempts::commit_attempt(self.db()?, attempt, transition).await
    }

    async fn record_attempt(&self, attempt: &NewAttempt) -> Result<(), CourierError> {
        queries::attempts::record_attempt(self.db()?, attempt).await
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), CourierError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.db
            .set(db)
            .map_err(|_| CourierError::storage("storage already initialized"))?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), CourierError> {
        let db = self.db()?;
        self.checkpoint(db).await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }

    // --- Message operations ---

    async fn insert_message(&self, message: &NewMessage) -> Result<(), CourierError> {
        queries::messages::insert_message(self.db()?, message).await
    }

    async fn list_messages(&self, limit: u32) -> Result<Vec<Message>, CourierError> {
        queries::messages::list_messages(self.db()?, limit).await
    }

    async fn list_attempts(&self, message_id: &str) -> Result<Vec<DeliveryAttempt>, CourierError> {
        queries::attempts::list_attempts(self.db()?, message_id).await
    }

    // --- Provider operations ---

    async fn list_providers(&self) -> Result<Vec<ProviderOverview>, CourierError> {
        queries::providers::list_providers(self.db()?).await
    }

    async fn get_provider(&self, code: &str) -> Result<Option<ProviderRecord>, CourierError> {
        queries::providers::get_provider(self.db()?, code).await
    }

    async fn create_provider(
        &self,
        provider: &NewProvider,
    ) -> Result<Option<ProviderRecord>, CourierError> {
        queries::providers::create_provider(self.db()?, provider).await
    }

    async fn update_provider_config(
        &self,
        code: &str,
        config: &Map<String, Value>,
    ) -> Result<Option<ProviderRecord>, CourierError> {
        queries::providers::update_provider_config(self.db()?, code, config).await
    }

    async fn delete_provider(&self, code: &str) -> Result<Option<ProviderRecord>, CourierError> {
        queries::providers::delete_provider(self.db()?, code).await
    }

    // --- API key operations ---

    async fn create_api_key(&self, name: &str) -> Result<ApiKeyRecord, CourierError> {
        queries::api_keys::create_api_key(self.db()?, name).await
    }

    async fn list_api_keys(&self) -> Result<Vec<ApiKeyRecord>, CourierError> {
        queries::api_keys::list_api_keys(self.db()?).await
    }

    async fn revoke_api_key(&self, api_key: &str) -> Result<bool, CourierError> {
        queries::api_keys::revoke_api_key(self.db()?, api_key).await
    }

    async fn verify_api_key(&self, api_key: &str) -> Result<bool, CourierError> {
        queries::api_keys::verify_api_key(self.db()?, api_key).await
    }
}
