// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for Courier.
//!
//! Exposes manual retry, message listing, provider management and a health
//! probe over axum. Every `/api/*` route requires an active API key in the
//! `X-Api-Key` header.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod providers;
pub mod server;

pub use error::ApiError;
pub use server::{GatewayState, HealthState, ServerConfig, build_router, serve, start_server};
