// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage traits for persistence backends (SQLite).

use async_trait::async_trait;

use crate::error::CourierError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{
    ApiKeyRecord, DeliveryAttempt, Message, NewAttempt, NewMessage, NewProvider,
    ProviderOverview, ProviderRecord, StatusTransition,
};

/// The narrow store interface the retry orchestrator depends on.
#[async_trait]
pub trait DeliveryStore: Send + Sync {
    /// Loads a message by id.
    async fn get_message(&self, message_id: &str) -> Result<Option<Message>, CourierError>;

    /// Appends an attempt and applies the status transition in one transaction.
    ///
    /// Fails, leaving no attempt row behind, if the message row cannot be updated.
    async fn commit_attempt(
        &self,
        attempt: &NewAttempt,
        transition: &StatusTransition,
    ) -> Result<(), CourierError>;

    /// Appends an attempt without touching the message row.
    async fn record_attempt(&self, attempt: &NewAttempt) -> Result<(), CourierError>;
}

/// Full storage backend used by the gateway and the CLI.
#[async_trait]
pub trait StorageAdapter: PluginAdapter + DeliveryStore {
    /// Initializes the storage backend (migrations, connection, etc.).
    async fn initialize(&self) -> Result<(), CourierError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), CourierError>;

    // --- Messages ---

    async fn insert_message(&self, message: &NewMessage) -> Result<(), CourierError>;

    /// Newest first, at most `limit` rows.
    async fn list_messages(&self, limit: u32) -> Result<Vec<Message>, CourierError>;

    /// Attempts for one message in insertion order.
    async fn list_attempts(&self, message_id: &str)
    -> Result<Vec<DeliveryAttempt>, CourierError>;

    // --- Providers ---

    async fn list_providers(&self) -> Result<Vec<ProviderOverview>, CourierError>;

    async fn get_provider(&self, code: &str) -> Result<Option<ProviderRecord>, CourierError>;

    /// Creates an active provider; returns `None` if the code is already taken.
    async fn create_provider(
        &self,
        provider: &NewProvider,
    ) -> Result<Option<ProviderRecord>, CourierError>;

    /// Replaces the provider config, activating it and resetting its
    /// connection status to `configured`. Returns `None` if the code is unknown.
    async fn update_provider_config(
        &self,
        code: &str,
        config: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<Option<ProviderRecord>, CourierError>;

    /// Deletes the provider; returns the removed row if it existed.
    async fn delete_provider(&self, code: &str) -> Result<Option<ProviderRecord>, CourierError>;

    // --- API keys ---

    async fn create_api_key(&self, name: &str) -> Result<ApiKeyRecord, CourierError>;

    async fn list_api_keys(&self) -> Result<Vec<ApiKeyRecord>, CourierError>;

    /// Deactivates a key; returns `false` if no such key exists.
    async fn revoke_api_key(&self, api_key: &str) -> Result<bool, CourierError>;

    /// Returns `true` for an existing active key and stamps `last_used_at`.
    async fn verify_api_key(&self, api_key: &str) -> Result<bool, CourierError>;
}
