// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The delivery core: retry orchestration, attempt recording and message
//! state transitions.

pub mod error;
pub mod orchestrator;
pub mod recorder;
pub mod state;

pub use error::RetryError;
pub use orchestrator::{RetryOrchestrator, RetryOutcome};
pub use recorder::AttemptRecorder;
