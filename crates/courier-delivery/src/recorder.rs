// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Attempt construction and persistence.

use std::sync::Arc;

use courier_core::types::{AttemptStatus, DispatchResponse, NewAttempt, StatusTransition};
use courier_core::{CourierError, DeliveryStore};
use tracing::{error, warn};

use crate::state;

/// Attempt row for a provider answer.
pub fn response_attempt(
    message_id: &str,
    attempt_number: u32,
    provider: &str,
    response: &DispatchResponse,
    duration_ms: u64,
) -> NewAttempt {
    let (status, error_message) = if response.is_delivered() {
        (AttemptStatus::Success, None)
    } else {
        (
            AttemptStatus::Failed,
            Some(state::rejection_reason(response.status_code)),
        )
    };
    NewAttempt {
        message_id: message_id.to_string(),
        attempt_number,
        provider: provider.to_string(),
        status,
        response_code: Some(response.status_code),
        response_body: response.body.clone(),
        error_message,
        duration_ms,
    }
}

/// Attempt row for a dispatch that raised: no code, empty body.
pub fn error_attempt(
    message_id: &str,
    attempt_number: u32,
    provider: &str,
    error: &str,
    duration_ms: u64,
) -> NewAttempt {
    NewAttempt {
        message_id: message_id.to_string(),
        attempt_number,
        provider: provider.to_string(),
        status: AttemptStatus::Error,
        response_code: None,
        response_body: String::new(),
        error_message: Some(error.to_string()),
        duration_ms,
    }
}

/// Writes attempts and their status transitions to the store.
#[derive(Clone)]
pub struct AttemptRecorder {
    store: Arc<dyn DeliveryStore>,
}

impl AttemptRecorder {
    pub fn new(store: Arc<dyn DeliveryStore>) -> Self {
        Self { store }
    }

    /// Appends the attempt and applies the transition atomically.
    pub async fn commit(
        &self,
        attempt: &NewAttempt,
        transition: &StatusTransition,
    ) -> Result<(), CourierError> {
        self.store.commit_attempt(attempt, transition).await
    }

    /// Best-effort bookkeeping for the error path.
    ///
    /// Tries the atomic commit first. If that fails, still tries to append
    /// the attempt alone so the failure leaves a trace; the message row then
    /// keeps its previous state. Nothing is returned: failures are logged.
    pub async fn record_error(&self, attempt: &NewAttempt, transition: &StatusTransition) {
        let Err(commit_err) = self.store.commit_attempt(attempt, transition).await else {
            return;
        };
        warn!(
            message_id = %attempt.message_id,
            error = %commit_err,
            "could not commit error attempt, recording attempt only"
        );
        if let Err(record_err) = self.store.record_attempt(attempt).await {
            error!(
                message_id = %attempt.message_id,
                attempt_number = attempt.attempt_number,
                error = %record_err,
                "could not record error attempt"
            );
        }
    }
}
