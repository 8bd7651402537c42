// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Courier delivery service.

use thiserror::Error;

/// The primary error type used across all Courier adapter traits and core operations.
#[derive(Debug, Error)]
pub enum CourierError {
    /// Configuration errors (invalid TOML, missing credentials, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Transport errors raised while building or driving a provider transport.
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// No transport is registered for the provider code.
    #[error("no transport registered for provider `{code}`")]
    UnknownProvider { code: String },

    /// A referenced row does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Input failed validation before touching the store.
    #[error("validation error: {0}")]
    Validation(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CourierError {
    /// Wraps any error as a storage failure.
    pub fn storage(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        CourierError::Storage {
            source: source.into(),
        }
    }

    /// Builds a `NotFound` for the given entity kind and id.
    pub fn not_found(entity: &str, id: impl Into<String>) -> Self {
        CourierError::NotFound {
            entity: entity.to_string(),
            id: id.into(),
        }
    }
}
