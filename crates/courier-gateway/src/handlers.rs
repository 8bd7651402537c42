// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Retry, message and health handlers.

use axum::{
    Json,
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use courier_core::types::Message;
use courier_core::HealthStatus;
use courier_delivery::RetryOutcome;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::auth::ApiKey;
use crate::error::ApiError;
use crate::server::GatewayState;

pub const DEFAULT_MESSAGE_LIMIT: i64 = 50;
pub const MAX_MESSAGE_LIMIT: i64 = 100;

/// POST /api/retry
pub async fn retry(
    _key: ApiKey,
    State(state): State<GatewayState>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let payload: Value = serde_json::from_slice(&body).map_err(|_| ApiError::InvalidJson)?;
    let message_id = payload
        .get("message_id")
        .and_then(Value::as_str)
        .unwrap_or_default();

    let outcome = state.orchestrator.retry(message_id).await?;
    Ok(retry_response(outcome))
}

fn retry_response(outcome: RetryOutcome) -> Response {
    match outcome {
        RetryOutcome::Delivered {
            message_id,
            attempts,
        } => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message_id": message_id,
                "status": "delivered",
                "attempts": attempts,
            })),
        )
            .into_response(),
        RetryOutcome::Rejected {
            message_id,
            attempts,
            error,
        } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "success": false,
                "message_id": message_id,
                "status": "failed",
                "attempts": attempts,
                "error": error,
            })),
        )
            .into_response(),
        RetryOutcome::Errored { message_id, error } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "success": false,
                "message_id": message_id,
                "status": "failed",
                "error": error,
            })),
        )
            .into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub struct MessagesQuery {
    pub limit: Option<String>,
    pub message_id: Option<String>,
}

/// Parses `limit`, defaulting to 50 and clamping into `[1, 100]`.
pub fn parse_limit(raw: Option<&str>) -> Result<u32, ApiError> {
    let limit = match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => DEFAULT_MESSAGE_LIMIT,
        Some(s) => s
            .parse::<i64>()
            .map_err(|_| ApiError::BadRequest("Invalid limit".to_string()))?,
    };
    // Clamped into 1..=100, always fits.
    Ok(limit.clamp(1, MAX_MESSAGE_LIMIT) as u32)
}

/// GET /api/messages
///
/// Lists recent messages, or returns one message with its attempt history
/// when `message_id` is given.
pub async fn list_messages(
    _key: ApiKey,
    State(state): State<GatewayState>,
    Query(query): Query<MessagesQuery>,
) -> Result<Response, ApiError> {
    if let Some(message_id) = query.message_id.as_deref().filter(|s| !s.is_empty()) {
        return message_detail(&state, message_id).await;
    }

    let limit = parse_limit(query.limit.as_deref())?;
    let messages = state.storage.list_messages(limit).await?;
    let summaries: Vec<Value> = messages.iter().map(message_summary).collect();

    Ok(Json(json!({
        "success": true,
        "count": summaries.len(),
        "messages": summaries,
    }))
    .into_response())
}

async fn message_detail(state: &GatewayState, message_id: &str) -> Result<Response, ApiError> {
    let message = state
        .storage
        .get_message(message_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Message not found".to_string()))?;
    let attempts = state.storage.list_attempts(message_id).await?;

    let mut detail = serde_json::to_value(&message).map_err(|e| ApiError::Internal {
        details: e.to_string(),
    })?;
    let attempts = serde_json::to_value(&attempts).map_err(|e| ApiError::Internal {
        details: e.to_string(),
    })?;
    if let Value::Object(map) = &mut detail {
        map.insert("delivery_attempts".to_string(), attempts);
    }

    Ok(Json(json!({ "success": true, "message": detail })).into_response())
}

fn message_summary(message: &Message) -> Value {
    json!({
        "message_id": message.message_id,
        "recipient": message.recipient,
        "provider": message.provider,
        "status": message.status.as_str(),
        "attempts": message.attempts,
        "max_attempts": message.max_attempts,
        "created_at": message.created_at,
    })
}

/// GET /health
pub async fn health(State(state): State<GatewayState>) -> Response {
    let uptime_secs = state.health.start_time.elapsed().as_secs();
    let (status_code, status) = match state.storage.health_check().await {
        Ok(HealthStatus::Healthy) => (StatusCode::OK, "healthy".to_string()),
        Ok(HealthStatus::Degraded(reason)) => (StatusCode::OK, format!("degraded: {reason}")),
        Ok(HealthStatus::Unhealthy(reason)) => {
            (StatusCode::SERVICE_UNAVAILABLE, format!("unhealthy: {reason}"))
        }
        Err(e) => {
            tracing::warn!(error = %e, "storage health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "unhealthy".to_string())
        }
    };

    (
        status_code,
        Json(json!({
            "status": status,
            "version": state.health.version,
            "uptime_secs": uptime_secs,
        })),
    )
        .into_response()
}

/// Answers bare OPTIONS requests that are not CORS preflights.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
