// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! API-key authentication.
//!
//! Implemented as an extractor rather than a middleware layer so that routing
//! decisions (unknown method, unknown path) are made before the store is hit.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::ApiError;
use crate::server::GatewayState;

pub const API_KEY_HEADER: &str = "x-api-key";

/// A verified API key. Extracting it stamps the key's `last_used_at`.
pub struct ApiKey(pub String);

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey([redacted])")
    }
}

impl FromRequestParts<GatewayState> for ApiKey {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &GatewayState,
    ) -> Result<Self, Self::Rejection> {
        let key = parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or(ApiError::MissingApiKey)?;

        if state.storage.verify_api_key(key).await? {
            Ok(ApiKey(key.to_string()))
        } else {
            tracing::debug!("rejected request with unknown or inactive API key");
            Err(ApiError::InvalidApiKey)
        }
    }
}
