// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP error responses.
//!
//! Every error renders as a JSON object with an `error` field.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use courier_core::CourierError;
use courier_delivery::RetryError;
use serde_json::json;

#[derive(Debug)]
pub enum ApiError {
    MissingApiKey,
    InvalidApiKey,
    InvalidJson,
    BadRequest(String),
    NotFound(String),
    AlreadyDelivered { message_id: String },
    Conflict(String),
    MethodNotAllowed,
    Internal { details: String },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingApiKey | ApiError::InvalidApiKey => StatusCode::UNAUTHORIZED,
            ApiError::InvalidJson | ApiError::BadRequest(_) | ApiError::AlreadyDelivered { .. } => {
                StatusCode::BAD_REQUEST
            }
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> serde_json::Value {
        match self {
            ApiError::MissingApiKey => json!({ "error": "Missing API key" }),
            ApiError::InvalidApiKey => json!({ "error": "Invalid API key" }),
            ApiError::InvalidJson => json!({ "error": "Invalid JSON" }),
            ApiError::BadRequest(msg) | ApiError::NotFound(msg) | ApiError::Conflict(msg) => {
                json!({ "error": msg })
            }
            ApiError::AlreadyDelivered { message_id } => json!({
                "error": "Message already delivered",
                "message_id": message_id,
            }),
            ApiError::MethodNotAllowed => json!({ "error": "Method not allowed" }),
            ApiError::Internal { details } => json!({
                "error": "Internal server error",
                "details": details,
            }),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal { details } = &self {
            tracing::error!(details = %details, "request failed");
        }
        (self.status(), Json(self.body())).into_response()
    }
}

impl From<CourierError> for ApiError {
    fn from(err: CourierError) -> Self {
        ApiError::Internal {
            details: err.to_string(),
        }
    }
}

impl From<RetryError> for ApiError {
    fn from(err: RetryError) -> Self {
        match err {
            RetryError::BadRequest(msg) => ApiError::BadRequest(msg),
            RetryError::NotFound { .. } => ApiError::NotFound("Message not found".to_string()),
            RetryError::AlreadyDelivered { message_id } => {
                ApiError::AlreadyDelivered { message_id }
            }
            RetryError::Store(e) => e.into(),
        }
    }
}
