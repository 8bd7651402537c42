// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Courier delivery service.
//!
//! This crate provides the trait definitions, error types, and domain types
//! used throughout the Courier workspace. Transports and storage backends
//! implement traits defined here.

pub mod error;
pub mod traits;
pub mod types;

pub use error::CourierError;
pub use types::{
    AdapterType, ApiKeyRecord, AttemptStatus, ConnectionStatus, DeliveryAttempt,
    DispatchResponse, HealthStatus, Message, MessageStatus, NewAttempt, NewMessage, NewProvider,
    ProviderOverview, ProviderRecord, StatusTransition,
};

pub use traits::{DeliveryStore, PluginAdapter, StorageAdapter, Transport};
