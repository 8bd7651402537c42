// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Manual retry of a single message.
//!
//! A retry loads the message, refuses delivered ones, dispatches through the
//! registry, then writes the attempt and the status transition together.
//! Concurrent retries of the same message are not serialized: both read the
//! same counter and both write the same attempt number.

use std::sync::Arc;
use std::time::Instant;

use courier_core::types::{DispatchResponse, Message};
use courier_core::{CourierError, DeliveryStore};
use courier_transport::TransportRegistry;
use tracing::{debug, info, warn};

use crate::error::RetryError;
use crate::recorder::{self, AttemptRecorder};
use crate::state;

/// How a dispatched retry ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryOutcome {
    /// The provider answered 200.
    Delivered { message_id: String, attempts: u32 },
    /// The provider answered with another status code.
    Rejected {
        message_id: String,
        attempts: u32,
        error: String,
    },
    /// Dispatch or bookkeeping raised.
    Errored { message_id: String, error: String },
}

impl RetryOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, RetryOutcome::Delivered { .. })
    }
}

pub struct RetryOrchestrator {
    store: Arc<dyn DeliveryStore>,
    registry: Arc<TransportRegistry>,
    recorder: AttemptRecorder,
}

impl RetryOrchestrator {
    pub fn new(store: Arc<dyn DeliveryStore>, registry: Arc<TransportRegistry>) -> Self {
        let recorder = AttemptRecorder::new(Arc::clone(&store));
        Self {
            store,
            registry,
            recorder,
        }
    }

    /// Retries delivery of `message_id` once.
    pub async fn retry(&self, message_id: &str) -> Result<RetryOutcome, RetryError> {
        if message_id.trim().is_empty() {
            return Err(RetryError::BadRequest("Missing message_id".to_string()));
        }

        let message = self
            .store
            .get_message(message_id)
            .await?
            .ok_or_else(|| RetryError::NotFound {
                message_id: message_id.to_string(),
            })?;

        if !state::is_retriable(&message.status) {
            debug!(message_id, "retry refused: already delivered");
            return Err(RetryError::AlreadyDelivered {
                message_id: message_id.to_string(),
            });
        }

        let attempt_number = message.attempts.saturating_add(1);
        info!(
            message_id,
            provider = %message.provider,
            attempt_number,
            "retrying delivery"
        );

        let started = Instant::now();
        let dispatched = self.dispatch(&message).await;
        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let result = match dispatched {
            Ok(response) => {
                self.finish(&message, attempt_number, &response, duration_ms)
                    .await
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(outcome) => Ok(outcome),
            Err(e) => Ok(self
                .fail(&message, attempt_number, &e.to_string(), duration_ms)
                .await),
        }
    }

    async fn dispatch(&self, message: &Message) -> Result<DispatchResponse, CourierError> {
        let transport = self.registry.resolve(&message.provider)?;
        Ok(transport
            .send(&message.recipient, &message.message_text)
            .await)
    }

    async fn finish(
        &self,
        message: &Message,
        attempt_number: u32,
        response: &DispatchResponse,
        duration_ms: u64,
    ) -> Result<RetryOutcome, CourierError> {
        let attempt = recorder::response_attempt(
            &message.message_id,
            attempt_number,
            &message.provider,
            response,
            duration_ms,
        );
        let transition = state::after_response(&message.message_id, attempt_number, response);
        self.recorder.commit(&attempt, &transition).await?;

        let outcome = match transition.last_error {
            None => RetryOutcome::Delivered {
                message_id: message.message_id.clone(),
                attempts: attempt_number,
            },
            Some(error) => RetryOutcome::Rejected {
                message_id: message.message_id.clone(),
                attempts: attempt_number,
                error,
            },
        };
        info!(
            message_id = %message.message_id,
            status_code = response.status_code,
            duration_ms,
            delivered = outcome.is_delivered(),
            "delivery attempt recorded"
        );
        Ok(outcome)
    }

    async fn fail(
        &self,
        message: &Message,
        attempt_number: u32,
        error: &str,
        duration_ms: u64,
    ) -> RetryOutcome {
        warn!(
            message_id = %message.message_id,
            attempt_number,
            error,
            "delivery attempt errored"
        );
        let attempt = recorder::error_attempt(
            &message.message_id,
            attempt_number,
            &message.provider,
            error,
            duration_ms,
        );
        let transition = state::after_error(&message.message_id, attempt_number, error);
        self.recorder.record_error(&attempt, &transition).await;

        RetryOutcome::Errored {
            message_id: message.message_id.clone(),
            error: error.to_string(),
        }
    }
}
