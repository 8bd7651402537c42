// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider-code to transport resolution.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use courier_config::model::TransportConfig;
use courier_core::{CourierError, Transport};
use tracing::{info, warn};

use crate::simulated::SimulatedTransport;
use crate::wappi::WappiTransport;

/// Provider codes delivered through Wappi.
pub const WAPPI_CODES: &[&str] = &["whatsapp_business", "telegram_bot", "wappi"];

/// Maps provider codes to transports.
///
/// Codes without a registered transport resolve to
/// [`CourierError::UnknownProvider`] unless a fallback is installed.
#[derive(Default)]
pub struct TransportRegistry {
    transports: HashMap<String, Arc<dyn Transport>>,
    fallback: Option<Arc<dyn Transport>>,
}

impl TransportRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the production registry: the Wappi group, plus the simulated
    /// fallback when `simulate_unknown_providers` is set.
    pub fn from_config(config: &TransportConfig) -> Result<Self, CourierError> {
        let timeout = Duration::from_secs(config.request_timeout_secs);
        let wappi: Arc<dyn Transport> = Arc::new(WappiTransport::new(&config.wappi, timeout)?);

        let mut registry = Self::new();
        for code in WAPPI_CODES {
            registry.register(*code, Arc::clone(&wappi));
        }

        if config.simulate_unknown_providers {
            warn!("unknown providers will be served by the simulated transport");
            registry.set_fallback(Arc::new(SimulatedTransport::new(
                Duration::from_millis(config.simulated_delay_ms),
                config.simulated_success_rate,
            )));
        }

        info!(codes = ?registry.codes(), "transport registry ready");
        Ok(registry)
    }

    pub fn register(&mut self, code: impl Into<String>, transport: Arc<dyn Transport>) {
        self.transports.insert(code.into(), transport);
    }

    pub fn set_fallback(&mut self, transport: Arc<dyn Transport>) {
        self.fallback = Some(transport);
    }

    /// Resolves the transport for `code`.
    pub fn resolve(&self, code: &str) -> Result<Arc<dyn Transport>, CourierError> {
        if let Some(transport) = self.transports.get(code) {
            return Ok(Arc::clone(transport));
        }
        match &self.fallback {
            Some(fallback) => {
                warn!(provider = code, "no transport registered, using simulated fallback");
                Ok(Arc::clone(fallback))
            }
            None => Err(CourierError::UnknownProvider {
                code: code.to_string(),
            }),
        }
    }

    /// Registered codes, sorted.
    pub fn codes(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self.transports.keys().map(String::as_str).collect();
        codes.sort_unstable();
        codes
    }

    pub fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }
}
