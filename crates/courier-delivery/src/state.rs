// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message status transitions.
//!
//! `pending` and `failed` messages may be dispatched; `delivered` is terminal.
//! Every dispatch sets `attempts` to the attempt number it used.

use courier_core::types::{DispatchResponse, MessageStatus, StatusTransition};

/// Whether a message in `status` may be dispatched again.
pub fn is_retriable(status: &MessageStatus) -> bool {
    !status.is_terminal()
}

/// The `last_error` text for a non-200 provider answer.
pub fn rejection_reason(status_code: u16) -> String {
    format!("Provider returned status {status_code}")
}

/// Transition after the provider answered.
pub fn after_response(
    message_id: &str,
    attempt_number: u32,
    response: &DispatchResponse,
) -> StatusTransition {
    if response.is_delivered() {
        StatusTransition {
            message_id: message_id.to_string(),
            status: MessageStatus::Delivered,
            attempts: attempt_number,
            last_error: None,
        }
    } else {
        StatusTransition {
            message_id: message_id.to_string(),
            status: MessageStatus::Failed,
            attempts: attempt_number,
            last_error: Some(rejection_reason(response.status_code)),
        }
    }
}

/// Transition after dispatch or bookkeeping raised.
pub fn after_error(message_id: &str, attempt_number: u32, error: &str) -> StatusTransition {
    StatusTransition {
        message_id: message_id.to_string(),
        status: MessageStatus::Failed,
        attempts: attempt_number,
        last_error: Some(error.to_string()),
    }
}
