// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Simulated transport for providers without a real integration.
//!
//! Not for production traffic: it never contacts anyone and succeeds at
//! random. The registry only hands it out when explicitly enabled.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use courier_core::{
    AdapterType, CourierError, DispatchResponse, HealthStatus, PluginAdapter, Transport,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// Waits a fixed delay, then reports success with a fixed probability.
pub struct SimulatedTransport {
    delay: Duration,
    success_rate: f64,
    rng: Mutex<StdRng>,
}

impl SimulatedTransport {
    pub fn new(delay: Duration, success_rate: f64) -> Self {
        Self {
            delay,
            success_rate: bounded_rate(success_rate),
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Deterministic variant for tests.
    pub fn with_seed(delay: Duration, success_rate: f64, seed: u64) -> Self {
        Self {
            delay,
            success_rate: bounded_rate(success_rate),
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn draw_success(&self) -> bool {
        match self.rng.lock() {
            Ok(mut rng) => rng.gen_bool(self.success_rate),
            // A poisoned lock still holds a usable generator.
            Err(poisoned) => poisoned.into_inner().gen_bool(self.success_rate),
        }
    }
}

/// Clamps into [0, 1]; NaN and infinities never succeed.
fn bounded_rate(rate: f64) -> f64 {
    if rate.is_finite() {
        rate.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[async_trait]
impl PluginAdapter for SimulatedTransport {
    fn name(&self) -> &str {
        "simulated"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Transport
    }

    async fn health_check(&self) -> Result<HealthStatus, CourierError> {
        Ok(HealthStatus::Degraded("simulated transport".to_string()))
    }

    async fn shutdown(&self) -> Result<(), CourierError> {
        Ok(())
    }
}

#[async_trait]
impl Transport for SimulatedTransport {
    async fn send(&self, recipient: &str, _text: &str) -> DispatchResponse {
        tokio::time::sleep(self.delay).await;

        if self.draw_success() {
            let message_id = uuid::Uuid::new_v4().to_string();
            debug!(recipient, %message_id, "simulated delivery succeeded");
            DispatchResponse::new(
                200,
                serde_json::json!({ "success": true, "message_id": message_id }).to_string(),
            )
        } else {
            debug!(recipient, "simulated delivery failed");
            DispatchResponse::new(
                500,
                serde_json::json!({
                    "success": false,
                    "error": "Provider temporary unavailable",
                })
                .to_string(),
            )
        }
    }
}
