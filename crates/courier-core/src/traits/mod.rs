// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions.
//!
//! Transports and storage backends extend the [`PluginAdapter`] base trait and
//! use `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod storage;
pub mod transport;

pub use adapter::PluginAdapter;
pub use storage::{DeliveryStore, StorageAdapter};
pub use transport::Transport;
