// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Courier integration tests.
//!
//! Provides mock adapters and test harness infrastructure for fast,
//! deterministic tests without external services.
//!
//! # Components
//!
//! - [`MockTransport`] - Scripted provider transport that records every send
//! - [`FlakyStore`] - Delivery store wrapper with switchable failures
//! - [`TestHarness`] - Temp SQLite store, registry, orchestrator and router

pub mod flaky_store;
pub mod harness;
pub mod mock_transport;

pub use flaky_store::FlakyStore;
pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_transport::{MockTransport, SentMessage};
