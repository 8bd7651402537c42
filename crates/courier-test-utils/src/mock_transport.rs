// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock provider transport for deterministic testing.
//!
//! `MockTransport` answers from a queue of scripted responses and captures
//! every `(recipient, text)` pair it was asked to send.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Barrier, Mutex};

use courier_core::types::{AdapterType, DispatchResponse, HealthStatus};
use courier_core::{CourierError, PluginAdapter, Transport};

/// A send captured by [`MockTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub recipient: String,
    pub text: String,
}

/// A scripted transport.
///
/// Once the queue is drained every send answers the default response
/// (`200 {"success":true}` unless changed).
pub struct MockTransport {
    responses: Mutex<VecDeque<DispatchResponse>>,
    default_response: DispatchResponse,
    sent: Mutex<Vec<SentMessage>>,
    delay: Option<Duration>,
    barrier: Option<Arc<Barrier>>,
}

impl MockTransport {
    /// Always answers 200.
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            default_response: DispatchResponse::new(200, r#"{"success":true}"#),
            sent: Mutex::new(Vec::new()),
            delay: None,
            barrier: None,
        }
    }

    /// Answers the given responses in order, then the default.
    pub fn with_responses(responses: Vec<DispatchResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            ..Self::new()
        }
    }

    /// Answers `response` for every send.
    pub fn always(response: DispatchResponse) -> Self {
        Self {
            default_response: response,
            ..Self::new()
        }
    }

    /// Sleeps before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Holds every send until `barrier` is released.
    ///
    /// Lets tests line up concurrent dispatches after their message reads.
    pub fn with_barrier(mut self, barrier: Arc<Barrier>) -> Self {
        self.barrier = Some(barrier);
        self
    }

    /// Queue another scripted response.
    pub async fn push_response(&self, response: DispatchResponse) {
        self.responses.lock().await.push_back(response);
    }

    /// All sends so far, oldest first.
    pub async fn sent_messages(&self) -> Vec<SentMessage> {
        self.sent.lock().await.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockTransport {
    fn name(&self) -> &str {
        "mock-transport"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Transport
    }

    async fn health_check(&self) -> Result<HealthStatus, CourierError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), CourierError> {
        Ok(())
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, recipient: &str, text: &str) -> DispatchResponse {
        self.sent.lock().await.push(SentMessage {
            recipient: recipient.to_string(),
            text: text.to_string(),
        });

        if let Some(barrier) = &self.barrier {
            barrier.wait().await;
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let scripted = self.responses.lock().await.pop_front();
        scripted.unwrap_or_else(|| self.default_response.clone())
    }
}
