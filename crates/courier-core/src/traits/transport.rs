// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transport trait for provider integrations (Wappi, simulated stand-ins, ...).

use async_trait::async_trait;

use crate::traits::adapter::PluginAdapter;
use crate::types::DispatchResponse;

/// A send operation towards one external provider.
///
/// `send` never fails: timeouts, network errors and missing credentials are
/// folded into a `(500, {"error": ...})` [`DispatchResponse`] so callers have a
/// single status code to branch on.
#[async_trait]
pub trait Transport: PluginAdapter {
    /// Sends `text` to `recipient` and returns the provider's raw answer.
    async fn send(&self, recipient: &str, text: &str) -> DispatchResponse;
}
