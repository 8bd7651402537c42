// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A [`DeliveryStore`] wrapper whose operations can be made to fail.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use courier_core::types::{Message, NewAttempt, StatusTransition};
use courier_core::{CourierError, DeliveryStore};

/// Delegates to an inner store unless the matching failure switch is on.
pub struct FlakyStore {
    inner: Arc<dyn DeliveryStore>,
    fail_get: AtomicBool,
    fail_commit: AtomicBool,
    fail_record: AtomicBool,
}

impl FlakyStore {
    pub fn new(inner: Arc<dyn DeliveryStore>) -> Self {
        Self {
            inner,
            fail_get: AtomicBool::new(false),
            fail_commit: AtomicBool::new(false),
            fail_record: AtomicBool::new(false),
        }
    }

    pub fn fail_get(&self, on: bool) {
        self.fail_get.store(on, Ordering::SeqCst);
    }

    pub fn fail_commit(&self, on: bool) {
        self.fail_commit.store(on, Ordering::SeqCst);
    }

    pub fn fail_record(&self, on: bool) {
        self.fail_record.store(on, Ordering::SeqCst);
    }

    fn injected(op: &str) -> CourierError {
        CourierError::storage(format!("injected {op} failure"))
    }
}

#[async_trait]
impl DeliveryStore for FlakyStore {
    async fn get_message(&self, message_id: &str) -> Result<Option<Message>, CourierError> {
        if self.fail_get.load(Ordering::SeqCst) {
            return Err(Self::injected("get_message"));
        }
        self.inner.get_message(message_id).await
    }

    async fn commit_attempt(
        &self,
        attempt: &NewAttempt,
        transition: &StatusTransition,
    ) -> Result<(), CourierError> {
        if self.fail_commit.load(Ordering::SeqCst) {
            return Err(Self::injected("commit_attempt"));
        }
        self.inner.commit_attempt(attempt, transition).await
    }

    async fn record_attempt(&self, attempt: &NewAttempt) -> Result<(), CourierError> {
        if self.fail_record.load(Ordering::SeqCst) {
            return Err(Self::injected("record_attempt"));
        }
        self.inner.record_attempt(attempt).await
    }
}
