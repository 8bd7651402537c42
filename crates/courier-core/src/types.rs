// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared by the storage, transport, delivery and gateway crates.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Transport,
    Storage,
}

/// Lifecycle status of an outbound message.
///
/// The delivery core only reasons about `pending`, `failed` and `delivered`.
/// Any other value found in the store is carried through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MessageStatus {
    Pending,
    Failed,
    Delivered,
    Other(String),
}

impl MessageStatus {
    pub fn as_str(&self) -> &str {
        match self {
            MessageStatus::Pending => "pending",
            MessageStatus::Failed => "failed",
            MessageStatus::Delivered => "delivered",
            MessageStatus::Other(s) => s,
        }
    }

    /// Delivered messages are never dispatched again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, MessageStatus::Delivered)
    }
}

impl fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for MessageStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "pending" => MessageStatus::Pending,
            "failed" => MessageStatus::Failed,
            "delivered" => MessageStatus::Delivered,
            _ => MessageStatus::Other(s),
        }
    }
}

impl From<&str> for MessageStatus {
    fn from(s: &str) -> Self {
        MessageStatus::from(s.to_string())
    }
}

impl From<MessageStatus> for String {
    fn from(status: MessageStatus) -> Self {
        match status {
            MessageStatus::Other(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

/// Outcome classification of a single delivery attempt.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AttemptStatus {
    /// The provider answered 200.
    Success,
    /// The provider answered with any other status code.
    Failed,
    /// Dispatch or bookkeeping raised before a provider answer was available.
    Error,
}

/// Connection state of a configured provider.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    NotConfigured,
    Configured,
    Working,
    Error,
}

/// An outbound message as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub message_id: String,
    pub provider: String,
    pub recipient: String,
    pub message_text: String,
    pub status: MessageStatus,
    pub attempts: u32,
    pub max_attempts: u32,
    pub last_error: Option<String>,
    pub created_at: String,
    pub last_attempt_at: Option<String>,
    pub completed_at: Option<String>,
}

/// Fields needed to enqueue a new message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMessage {
    pub message_id: String,
    pub provider: String,
    pub recipient: String,
    pub message_text: String,
    pub max_attempts: u32,
}

/// A recorded delivery attempt. Rows are append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryAttempt {
    pub id: i64,
    pub message_id: String,
    pub attempt_number: u32,
    pub provider: String,
    pub status: AttemptStatus,
    pub response_code: Option<u16>,
    pub response_body: String,
    pub error_message: Option<String>,
    pub duration_ms: u64,
    pub attempted_at: String,
}

/// An attempt about to be appended. `attempted_at` is assigned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAttempt {
    pub message_id: String,
    pub attempt_number: u32,
    pub provider: String,
    pub status: AttemptStatus,
    pub response_code: Option<u16>,
    pub response_body: String,
    pub error_message: Option<String>,
    pub duration_ms: u64,
}

/// The message-row update that follows an attempt.
///
/// `completed_at` is stamped only when `status` is `Delivered`;
/// `last_attempt_at` is always stamped.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusTransition {
    pub message_id: String,
    pub status: MessageStatus,
    pub attempts: u32,
    pub last_error: Option<String>,
}

/// The raw answer of a provider transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchResponse {
    pub status_code: u16,
    pub body: String,
}

impl DispatchResponse {
    pub fn new(status_code: u16, body: impl Into<String>) -> Self {
        Self {
            status_code,
            body: body.into(),
        }
    }

    /// A transport-level failure folded into a `(500, {"error": reason})` pair.
    pub fn transport_error(reason: impl fmt::Display) -> Self {
        Self {
            status_code: 500,
            body: serde_json::json!({ "error": reason.to_string() }).to_string(),
        }
    }

    /// Only a literal 200 counts as delivered; other 2xx codes do not.
    pub fn is_delivered(&self) -> bool {
        self.status_code == 200
    }
}

/// A configured provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderRecord {
    pub provider_code: String,
    pub provider_name: String,
    pub provider_type: String,
    pub is_active: bool,
    pub config: serde_json::Map<String, serde_json::Value>,
    pub connection_status: ConnectionStatus,
    pub created_at: String,
    pub updated_at: String,
}

impl ProviderRecord {
    pub fn has_config(&self) -> bool {
        !self.config.is_empty()
    }
}

/// A provider row joined with its most recent delivery attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderOverview {
    pub provider: ProviderRecord,
    pub last_attempt_status: Option<AttemptStatus>,
    pub last_response_code: Option<u16>,
    pub last_attempt_at: Option<String>,
}

impl ProviderOverview {
    /// Connection status as shown to operators.
    ///
    /// An attempt newer than the last config change overrides the stored
    /// status: `working` for a 200 success, `error` for anything else.
    pub fn effective_connection_status(&self) -> ConnectionStatus {
        if !self.provider.has_config() {
            return ConnectionStatus::NotConfigured;
        }
        match (&self.last_attempt_status, &self.last_attempt_at) {
            (Some(status), Some(at)) if at.as_str() > self.provider.updated_at.as_str() => {
                if *status == AttemptStatus::Success && self.last_response_code == Some(200) {
                    ConnectionStatus::Working
                } else {
                    ConnectionStatus::Error
                }
            }
            _ => self.provider.connection_status,
        }
    }
}

/// Fields accepted when creating a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProvider {
    pub provider_code: String,
    pub provider_name: String,
    pub provider_type: String,
    pub config: serde_json::Map<String, serde_json::Value>,
}

/// An API key able to call the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiKeyRecord {
    pub id: i64,
    pub name: String,
    pub api_key: String,
    pub is_active: bool,
    pub created_at: String,
    pub last_used_at: Option<String>,
}
