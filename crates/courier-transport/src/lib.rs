// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider transports for the Courier delivery service.
//!
//! Each transport implements [`courier_core::Transport`] and folds every
//! failure into a `(status, body)` pair. The [`TransportRegistry`] maps
//! provider codes to transports.

pub mod registry;
pub mod simulated;
pub mod wappi;

pub use registry::TransportRegistry;
pub use simulated::SimulatedTransport;
pub use wappi::WappiTransport;

/// Strips `+`, `-` and spaces from a phone-style recipient.
///
/// `"+7 (900) 123-45-67"` becomes `"7(900)1234567"`; other characters are kept.
pub fn normalize_recipient(recipient: &str) -> String {
    recipient
        .chars()
        .filter(|c| !matches!(c, '+' | '-' | ' '))
        .collect()
}
