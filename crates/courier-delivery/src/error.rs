// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors a retry request can end with before anything is dispatched.

use courier_core::CourierError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RetryError {
    /// The request itself is unusable.
    #[error("{0}")]
    BadRequest(String),

    #[error("Message not found")]
    NotFound { message_id: String },

    /// Delivered messages are never dispatched again.
    #[error("Message already delivered")]
    AlreadyDelivered { message_id: String },

    /// The message could not be loaded.
    #[error(transparent)]
    Store(#[from] CourierError),
}
