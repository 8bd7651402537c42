// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Courier delivery service.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Courier configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CourierConfig {
    /// Service identity and logging.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// HTTP gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Provider transport settings and credentials.
    #[serde(default)]
    pub transport: TransportConfig,
}

/// Service identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Display name used in logs and the health probe.
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_service_name() -> String {
    "courier".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("courier").join("courier.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("courier.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// HTTP gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Address to bind the HTTP server to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind. `0` picks a free port.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

/// Provider transport configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TransportConfig {
    /// Route provider codes without a real integration to the simulated
    /// transport. When `false`, such messages fail with an unknown-provider error.
    #[serde(default)]
    pub simulate_unknown_providers: bool,

    /// Fixed timeout for outbound provider requests, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Probability that the simulated transport reports success.
    #[serde(default = "default_simulated_success_rate")]
    pub simulated_success_rate: f64,

    /// Fixed delay of the simulated transport, in milliseconds.
    #[serde(default = "default_simulated_delay_ms")]
    pub simulated_delay_ms: u64,

    /// Wappi (WhatsApp/Telegram gateway) credentials.
    #[serde(default)]
    pub wappi: WappiConfig,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            simulate_unknown_providers: false,
            request_timeout_secs: default_request_timeout_secs(),
            simulated_success_rate: default_simulated_success_rate(),
            simulated_delay_ms: default_simulated_delay_ms(),
            wappi: WappiConfig::default(),
        }
    }
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_simulated_success_rate() -> f64 {
    0.8
}

fn default_simulated_delay_ms() -> u64 {
    100
}

/// Wappi API credentials.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WappiConfig {
    /// Base URL of the Wappi API.
    #[serde(default = "default_wappi_base_url")]
    pub base_url: String,

    /// Value of the `Authorization` header. `None` leaves Wappi unconfigured.
    #[serde(default)]
    pub token: Option<String>,

    /// Wappi profile the messages are sent from.
    #[serde(default)]
    pub profile_id: Option<String>,
}

impl Default for WappiConfig {
    fn default() -> Self {
        Self {
            base_url: default_wappi_base_url(),
            token: None,
            profile_id: None,
        }
    }
}

impl std::fmt::Debug for WappiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WappiConfig")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "[redacted]"))
            .field("profile_id", &self.profile_id)
            .finish()
    }
}

fn default_wappi_base_url() -> String {
    "https://wappi.pro".to_string()
}
